pub mod theme;
mod detail;
mod formatting;
mod modals;

use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use detail::render_detail;
use modals::{render_delete_confirmation_modal, render_help_modal};
use theme::theme_colors;

const MIN_WIDTH: u16 = 50;
const MIN_HEIGHT: u16 = 24;

/// Render the UI
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let theme = theme_colors();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        // Nothing measurable on screen, so the sentinel stays silent
        app.sentinel_ratio = None;
        let warning = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Terminal Too Small",
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Minimum size: {}x{}", MIN_WIDTH, MIN_HEIGHT),
                Style::default().fg(theme.text),
            )),
            Line::from(Span::styled(
                format!("Current size: {}x{}", area.width, area.height),
                Style::default().fg(theme.warning),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error)),
        );
        frame.render_widget(warning, area);
        return;
    }

    render_detail(frame, app, area);

    if app.show_delete_confirmation {
        render_delete_confirmation_modal(frame, app, area);
    }
    if app.show_help {
        render_help_modal(frame, area);
    }
}
