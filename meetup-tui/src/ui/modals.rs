use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::formatting::centered_rect;
use super::theme::theme_colors;
use crate::app::App;

const SHORTCUTS: &[(&str, &[(&str, &str)])] = &[
    (
        "Images",
        &[
            ("h / ←", "Previous image"),
            ("l / →", "Next image"),
            ("1-9", "Jump to image"),
            ("drag", "Swipe the carousel"),
        ],
    ),
    (
        "Comments",
        &[
            ("j / ↓", "Next comment"),
            ("k / ↑", "Previous comment"),
            ("G / End", "Jump to the end"),
            ("c / i", "Write a comment"),
            ("d", "Delete your comment"),
        ],
    ),
    (
        "Post",
        &[
            ("f", "Like / unlike"),
            ("r", "Retry a failed load"),
            ("q / Esc", "Leave"),
        ],
    ),
];

/// Render help modal
pub fn render_help_modal(frame: &mut Frame, area: Rect) {
    let theme = theme_colors();
    let modal_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal_area);

    let mut lines = vec![Line::from("")];
    for (category, items) in SHORTCUTS {
        lines.push(Line::from(Span::styled(
            *category,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
        for (key, description) in items.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", key), Style::default().fg(theme.success)),
                Span::styled(*description, Style::default().fg(theme.text)),
            ]));
        }
        lines.push(Line::from(""));
    }

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
                .title(" Keyboard Shortcuts ")
                .title_alignment(Alignment::Center)
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(help, modal_area);
}

/// Render delete confirmation for the selected comment
pub fn render_delete_confirmation_modal(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme_colors();
    let modal_area = centered_rect(50, 35, area);
    frame.render_widget(Clear, modal_area);

    let preview: String = app
        .selected_comment()
        .map(|c| c.body.chars().take(40).collect())
        .unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Delete this comment?",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("\"{}\"", preview),
            Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default().fg(theme.warning),
        )),
        Line::from(""),
        Line::from("─".repeat(40)).style(Style::default().fg(theme.border)),
        Line::from(vec![
            Span::styled("Y", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)),
            Span::styled(": Delete  ", Style::default().fg(theme.text)),
            Span::styled("N", Style::default().fg(theme.success).add_modifier(Modifier::BOLD)),
            Span::styled(": Cancel  ", Style::default().fg(theme.text)),
            Span::styled("Esc", Style::default().fg(theme.success).add_modifier(Modifier::BOLD)),
            Span::styled(": Cancel", Style::default().fg(theme.text)),
        ]),
    ];

    let modal = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.warning).add_modifier(Modifier::BOLD))
                .title(" Delete Comment ")
                .title_alignment(Alignment::Center)
                .style(Style::default().bg(theme.background)),
        );
    frame.render_widget(modal, modal_area);
}
