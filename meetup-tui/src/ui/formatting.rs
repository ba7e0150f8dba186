use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// "just now", "5m", "3h", "2d", or a date for anything older than a week
pub fn format_relative_time(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d", elapsed.num_days())
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

/// Indicator dots for the carousel, two cells per dot
pub fn carousel_dots(index: usize, count: usize) -> String {
    (0..count)
        .map(|i| if i == index { "● " } else { "○ " })
        .collect()
}

/// Rectangle of `percent_x` by `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now: DateTime<Utc> = "2024-05-10T12:00:00Z".parse().unwrap();
        assert_eq!(format_relative_time(&now, &now), "just now");
        assert_eq!(format_relative_time(&(now - Duration::minutes(5)), &now), "5m");
        assert_eq!(format_relative_time(&(now - Duration::hours(3)), &now), "3h");
        assert_eq!(format_relative_time(&(now - Duration::days(2)), &now), "2d");
        assert_eq!(format_relative_time(&(now - Duration::days(9)), &now), "2024-05-01");
    }

    #[test]
    fn test_dots_mark_current_image() {
        assert_eq!(carousel_dots(1, 3), "○ ● ○ ");
        assert_eq!(carousel_dots(0, 0), "");
    }
}
