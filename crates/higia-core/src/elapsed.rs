//! Elapsed-time math for the running-session display.

use chrono::{DateTime, Utc};

/// Whole seconds between `started_at` and `now`, floored.
///
/// A start timestamp in the future (device clock behind the server) yields 0
/// rather than a negative count.
pub fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - started_at).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis / 1000) as u64
    }
}

/// Formats whole seconds as `HH:MM:SS`.
///
/// Every field is zero-padded to two digits; the hour field grows past two
/// digits instead of wrapping.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Coarse "N min" label used in session listings.
pub fn format_minutes_since(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{} min", elapsed_seconds(started_at, now) / 60)
}
