//! Formatting helpers for countdowns and durations

/// Format a countdown as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so a 90 minute focus reads `90:00`.
/// Negative input only exists for an instant before a phase change and
/// is shown as `00:00`.
pub fn clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a number of minutes for humans (e.g. "25m", "1h 30m")
pub fn minutes(total: u32) -> String {
    let hours = total / 60;
    let mins = total % 60;
    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(25 * 60), "25:00");
        assert_eq!(clock(61), "01:01");
        assert_eq!(clock(9), "00:09");
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(90 * 60 + 5), "90:05");
        assert_eq!(clock(125 * 60), "125:00");
    }

    #[test]
    fn test_clock_clamps_negative() {
        assert_eq!(clock(-1), "00:00");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(minutes(25), "25m");
        assert_eq!(minutes(60), "1h");
        assert_eq!(minutes(90), "1h 30m");
        assert_eq!(minutes(0), "0m");
    }
}
