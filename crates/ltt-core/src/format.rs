//! Display formatting for durations and hour totals.

/// Formats seconds as a zero-padded `HH:MM:SS` clock.
///
/// Hours are not wrapped, so 100 hours renders as `100:00:00`.
pub fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats seconds as an adaptive human-readable duration.
///
/// - under a minute: `"45s"`
/// - under an hour: `"12m 5s"`, or `"12m"` on a whole minute
/// - an hour or more: `"2h 30m"`, or `"2h"` on a whole hour (seconds dropped)
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours == 0 && minutes == 0 {
        return format!("{seconds}s");
    }

    if hours == 0 {
        return if seconds > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{minutes}m")
        };
    }

    if minutes > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{hours}h")
    }
}

/// Formats fractional hours with two decimals.
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.2}")
}

/// Converts a (possibly negative) hour amount into whole seconds of magnitude.
///
/// Over-budget remaining time is negative; callers format its magnitude and
/// flag the sign separately.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "hour totals are far below u64::MAX seconds and abs() is non-negative"
)]
pub fn hours_to_abs_seconds(hours: f64) -> u64 {
    (hours.abs() * 3600.0).round() as u64
}
