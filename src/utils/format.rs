/// Format a countdown in minutes as zero-padded "HH:MM"
pub fn format_countdown(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Format a countdown in minutes as "Xh Ym" or "Ym"
pub fn format_duration_mins(minutes: i64) -> String {
    if minutes <= 0 {
        return "now".to_string();
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_is_zero_padded() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(719), "11:59");
        assert_eq!(format_countdown(-3), "00:00");
    }

    #[test]
    fn duration_words() {
        assert_eq!(format_duration_mins(0), "now");
        assert_eq!(format_duration_mins(42), "42m");
        assert_eq!(format_duration_mins(125), "2h 5m");
    }

    #[test]
    fn bar_clamps_overflow() {
        assert_eq!(progress_bar(5, 10, 4), "██░░");
        assert_eq!(progress_bar(12, 10, 3), "███");
        assert_eq!(progress_bar(1, 0, 2), "░░");
    }
}
