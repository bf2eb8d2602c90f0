//! Human-readable duration formatting
//!
//! Provides the two renderings used across the app: hour totals in reports
//! (`"7h 30m"`) and the running stopwatch (`"01:05:09"`).

/// Format fractional hours as whole hours and rounded minutes.
///
/// Minutes that round up to 60 carry into the hour. Negative and non-finite
/// inputs render as zero.
///
/// ```
/// use timesheet_common::time::format_hours;
///
/// assert_eq!(format_hours(0.0), "0h 0m");
/// assert_eq!(format_hours(1.5), "1h 30m");
/// assert_eq!(format_hours(7.25), "7h 15m");
/// ```
pub fn format_hours(hours: f64) -> String {
    let hours = if hours.is_finite() && hours > 0.0 { hours } else { 0.0 };
    let total_minutes = (hours * 60.0).round() as u64;
    let mut whole = hours.floor() as u64;
    let mut minutes = ((hours - hours.floor()) * 60.0).round() as u64;

    if minutes >= 60 {
        whole = total_minutes / 60;
        minutes = total_minutes % 60;
    }

    format!("{whole}h {minutes}m")
}

/// Format a number of seconds as a zero-padded `HH:MM:SS` stopwatch.
///
/// Hours are not wrapped at 24.
///
/// ```
/// use timesheet_common::time::format_clock;
///
/// assert_eq!(format_clock(0), "00:00:00");
/// assert_eq!(format_clock(3_909), "01:05:09");
/// assert_eq!(format_clock(90_000), "25:00:00");
/// ```
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
