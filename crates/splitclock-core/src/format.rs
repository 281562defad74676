//! Human-readable time formatting.

use crate::stats::SplitSummary;

/// Format a stopwatch reading.
///
/// `MM:SS.cc` (centiseconds, floored), or `HH:MM:SS.cc` once an hour has
/// elapsed. With `show_ms == false` the fractional part is dropped.
pub fn format_elapsed(ms: u64, show_ms: bool) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let centis = (ms % 1000) / 10;

    match (hours > 0, show_ms) {
        (true, true) => format!("{hours:02}:{minutes:02}:{seconds:02}.{centis:02}"),
        (true, false) => format!("{hours:02}:{minutes:02}:{seconds:02}"),
        (false, true) => format!("{minutes:02}:{seconds:02}.{centis:02}"),
        (false, false) => format!("{minutes:02}:{seconds:02}"),
    }
}

/// Format a countdown reading as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_countdown(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Plain-text results block for sharing a stopwatch session.
pub fn results_text(elapsed_ms: u64, laps: &[u64], show_ms: bool) -> String {
    let summary = SplitSummary::from_laps(laps);
    let fmt = |v: Option<u64>| v.map_or_else(|| "--".to_string(), |ms| format_elapsed(ms, show_ms));
    format!(
        "Stopwatch Results:\nTotal Time: {}\nLaps: {}\nBest Lap: {}\nAverage: {}",
        format_elapsed(elapsed_ms, show_ms),
        laps.len(),
        fmt(summary.map(|s| s.best_ms)),
        fmt(summary.map(|s| s.average_ms)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_under_an_hour() {
        assert_eq!(format_elapsed(0, true), "00:00.00");
        assert_eq!(format_elapsed(1234, true), "00:01.23");
        assert_eq!(format_elapsed(61_999, true), "01:01.99");
        assert_eq!(format_elapsed(61_999, false), "01:01");
    }

    #[test]
    fn elapsed_over_an_hour() {
        assert_eq!(format_elapsed(3_723_450, true), "01:02:03.45");
        assert_eq!(format_elapsed(3_723_450, false), "01:02:03");
    }

    #[test]
    fn countdown_floors_seconds() {
        assert_eq!(format_countdown(300_000), "05:00");
        assert_eq!(format_countdown(29_500), "00:29");
        assert_eq!(format_countdown(99 * 60_000 + 59_000), "99:59");
        assert_eq!(format_countdown(0), "00:00");
    }

    #[test]
    fn results_text_without_laps_has_no_data_markers() {
        let text = results_text(5000, &[], true);
        assert!(text.contains("Laps: 0"));
        assert!(text.contains("Best Lap: --"));
        assert!(text.contains("Average: --"));
    }

    #[test]
    fn results_text_with_laps() {
        let text = results_text(2000, &[1234, 1734], true);
        assert!(text.contains("Total Time: 00:02.00"));
        assert!(text.contains("Laps: 2"));
        assert!(text.contains("Best Lap: 00:00.50"));
        assert!(text.contains("Average: 00:00.86"));
    }
}
