use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::formatting::{carousel_dots, format_relative_time};
use super::theme::{theme_colors, ThemeColors};
use crate::api::FeedError;
use crate::app::{App, InputMode};
use crate::feed::Phase;
use meetup_types::Comment;

const CAROUSEL_HEIGHT: u16 = 9;
const POST_HEIGHT: u16 = 5;
const SENTINEL_HEIGHT: usize = 1;

/// Render the feed detail screen
pub fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = theme_colors();
    let footer_height = if app.composer.is_open() { 5 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(CAROUSEL_HEIGHT),
            Constraint::Length(POST_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(footer_height),
        ])
        .split(area);

    render_header(frame, app, chunks[0], &theme);

    match app.view_model.phase().clone() {
        Phase::Ready => {
            render_carousel(frame, app, chunks[1], &theme);
            render_post(frame, app, chunks[2], &theme);
            render_comments(frame, app, chunks[3], &theme);
        }
        phase => {
            app.layout = Default::default();
            app.sentinel_ratio = None;
            let body = Rect {
                height: chunks[1].height + chunks[2].height + chunks[3].height,
                ..chunks[1]
            };
            render_placeholder(frame, &phase, body, &theme);
        }
    }

    if app.composer.is_open() {
        render_composer(frame, app, chunks[4], &theme);
    } else {
        render_footer(frame, app, chunks[4], &theme);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let title = match app.view_model.post() {
        Some(post) => format!(" Post #{} by {} ", post.id, post.author.nickname),
        None => format!(" Post #{} ", app.view_model.post_id()),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(title, Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
        Span::styled("  ?: Help", Style::default().fg(theme.text_dim)),
    ]));
    frame.render_widget(header, area);
}

fn render_placeholder(frame: &mut Frame, phase: &Phase, area: Rect, theme: &ThemeColors) {
    let (headline, detail, color) = match phase {
        Phase::Idle | Phase::Loading => ("Loading post...", String::new(), theme.accent),
        Phase::Failed(FeedError::NotFound(_)) => (
            "Post not found",
            "It may have been deleted. Press q to go back.".to_string(),
            theme.warning,
        ),
        Phase::Failed(err) => ("Couldn't load post", format!("{}  Press r to retry.", err), theme.error),
        Phase::Ready => return,
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(headline, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(detail, Style::default().fg(theme.text_dim))),
    ];
    let placeholder = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(placeholder, area);
}

fn render_carousel(frame: &mut Frame, app: &mut App, area: Rect, theme: &ThemeColors) {
    let carousel = app.view_model.carousel();
    let count = carousel.image_count();
    let index = carousel.index();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(if count == 0 {
            " No images ".to_string()
        } else {
            format!(" [{}/{}] ", index + 1, count)
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = app
        .view_model
        .post()
        .and_then(|post| post.images.get(index))
        .map(|image| image.label().to_string())
        .unwrap_or_default();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let image = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("▣", Style::default().fg(theme.secondary))),
        Line::from(Span::styled(label, Style::default().fg(theme.text))),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(image, rows[0]);

    let dots = carousel_dots(index, count);
    let dots_width = (count * 2) as u16;
    let dots_area = Rect {
        x: rows[1].x + rows[1].width.saturating_sub(dots_width) / 2,
        y: rows[1].y,
        width: dots_width.min(rows[1].width),
        height: 1,
    };
    let nav_hint = if carousel.is_navigable() {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_dim)
    };
    frame.render_widget(Paragraph::new(Span::styled(dots, nav_hint)), dots_area);

    app.layout.carousel = area;
    app.layout.dots = dots_area;
}

fn render_post(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let Some(post) = app.view_model.post() else {
        return;
    };
    let like_style = if post.liked {
        Style::default().fg(theme.error).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_dim)
    };
    let lines = vec![
        Line::from(Span::styled(post.content.clone(), Style::default().fg(theme.text))),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("♥ {}", post.like_count), like_style),
            Span::raw("  "),
            Span::styled(format!("💬 {}", post.comment_count), Style::default().fg(theme.text_dim)),
            Span::raw("  "),
            Span::styled(
                format_relative_time(&post.created_at, &Utc::now()),
                Style::default().fg(theme.text_dim),
            ),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(theme.border)));
    frame.render_widget(paragraph, area);
}

/// Break a comment body into rows of at most `width` characters
fn wrap_body(body: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in body.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
    }
    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

fn comment_item<'a>(comment: &Comment, pending: bool, selected: bool, width: usize, theme: &ThemeColors) -> ListItem<'a> {
    let prefix = if selected { "▶ " } else { "  " };
    let name_style = if comment.is_mine {
        Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.primary)
    };
    let mut header = vec![
        Span::styled(prefix, name_style),
        Span::styled(comment.author.nickname.clone(), name_style),
        Span::raw(" • "),
        Span::styled(
            format_relative_time(&comment.created_at, &Utc::now()),
            Style::default().fg(theme.text_dim),
        ),
    ];
    if pending {
        header.push(Span::styled(
            "  sending",
            Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
        ));
    }

    let mut lines = vec![Line::from(header)];
    for row in wrap_body(&comment.body, width.saturating_sub(2)) {
        lines.push(Line::from(vec![Span::raw("  "), Span::styled(row, Style::default().fg(theme.text))]));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn sentinel_item<'a>(app: &App, theme: &ThemeColors) -> ListItem<'a> {
    let pagination = app.view_model.pagination();
    let text = if pagination.in_flight() {
        "Loading more comments…"
    } else if pagination.has_more() {
        "· · ·"
    } else {
        "No more comments"
    };
    ListItem::new(Line::from(Span::styled(text, Style::default().fg(theme.text_dim))).alignment(Alignment::Center))
}

fn render_comments(frame: &mut Frame, app: &mut App, area: Rect, theme: &ThemeColors) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" Comments ({}) ", app.view_model.comments().len()));
    let inner = block.inner(area);
    let width = usize::from(inner.width);
    let selected = app.comment_list.selected();

    let mut heights = Vec::with_capacity(app.view_model.comments().len() + 1);
    let mut items: Vec<ListItem> = app
        .view_model
        .comments()
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            let item = comment_item(
                comment,
                app.view_model.is_pending(comment.id),
                selected == Some(i),
                width,
                theme,
            );
            heights.push(item.height());
            item
        })
        .collect();
    items.push(sentinel_item(app, theme));
    heights.push(SENTINEL_HEIGHT);

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.highlight_bg));
    frame.render_stateful_widget(list, area, &mut app.comment_list);

    app.layout.comments = area;
    app.sentinel_ratio = Some(sentinel_visible_ratio(
        &heights,
        app.comment_list.offset(),
        usize::from(inner.height),
    ));
    log_rendering!(
        app.log_config,
        "comments rendered: {} rows, offset {}, sentinel {:?}",
        heights.len(),
        app.comment_list.offset(),
        app.sentinel_ratio
    );
}

/// Fraction of the last row (the sentinel) inside a viewport of `viewport` lines
/// when the list is scrolled to `offset`.
pub(crate) fn sentinel_visible_ratio(heights: &[usize], offset: usize, viewport: usize) -> f32 {
    let Some((&sentinel, above)) = heights.split_last() else {
        return 0.0;
    };
    if sentinel == 0 || offset > above.len() {
        return 0.0;
    }
    let top: usize = above.iter().skip(offset).sum();
    let shown = viewport.saturating_sub(top).min(sentinel);
    shown as f32 / sentinel as f32
}

fn render_composer(frame: &mut Frame, app: &mut App, area: Rect, theme: &ThemeColors) {
    let max = app.view_model.config().max_comment_chars;
    let count = app.composer.char_count();
    let counter_style = if count > max {
        Style::default().fg(theme.error).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_dim)
    };
    let border_color = if app.input_mode == InputMode::Typing { theme.accent } else { theme.border };

    app.composer.textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" New comment  Enter: Post  Esc: Cancel ")
            .title_bottom(Line::from(Span::styled(format!(" {}/{} ", count, max), counter_style)).right_aligned()),
    );
    app.composer.textarea.set_style(Style::default().fg(theme.text));
    frame.render_widget(&app.composer.textarea, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let line = match &app.message {
        Some((text, _)) => Line::from(Span::styled(text.clone(), Style::default().fg(theme.warning))),
        None => Line::from(Span::styled(
            "h/l: Image | j/k: Comments | f: Like | c: Comment | d: Delete | q: Quit",
            Style::default().fg(theme.text_dim),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_hidden_below_viewport() {
        // three comments of three rows each, then the sentinel
        let heights = [3, 3, 3, 1];
        assert_eq!(sentinel_visible_ratio(&heights, 0, 8), 0.0);
    }

    #[test]
    fn test_sentinel_visible_when_list_fits() {
        let heights = [3, 3, 3, 1];
        assert_eq!(sentinel_visible_ratio(&heights, 0, 10), 1.0);
        assert_eq!(sentinel_visible_ratio(&heights, 0, 20), 1.0);
    }

    #[test]
    fn test_sentinel_visible_after_scrolling() {
        let heights = [3, 3, 3, 1];
        assert_eq!(sentinel_visible_ratio(&heights, 2, 4), 1.0);
        assert_eq!(sentinel_visible_ratio(&heights, 1, 4), 0.0);
    }

    #[test]
    fn test_only_sentinel() {
        assert_eq!(sentinel_visible_ratio(&[1], 0, 3), 1.0);
        assert_eq!(sentinel_visible_ratio(&[], 0, 3), 0.0);
    }

    #[test]
    fn test_wrap_body_splits_long_lines() {
        assert_eq!(wrap_body("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_body("", 4), vec![""]);
        assert_eq!(wrap_body("a\nb", 4), vec!["a", "b"]);
    }
}
