//! Time helpers
//!
//! All persisted timestamps are unix milliseconds (i64).

/// Milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Current unix time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Whole days elapsed between two millisecond timestamps, rounded up,
/// never less than 1.
///
/// This is the divisor for daily-sales-average: a product whose first sale
/// happened an hour ago still counts as one elapsed day.
pub fn days_elapsed_at_least_one(from_ms: i64, to_ms: i64) -> i64 {
    let delta = (to_ms - from_ms).max(0);
    (delta + DAY_MS - 1) / DAY_MS
}

/// Format a millisecond timestamp as `YYYY-MM-DD HH:MM` UTC.
pub fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Format a millisecond timestamp as the `YYYY-MM-DD` date only.
pub fn format_date(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ms.to_string())
}
