//! Helpers for query-parameter marshaling and timestamp display.

use chrono::{DateTime, Local, Utc};
use std::fmt::Display;

/// Join values into the comma-separated form the API expects for id and tag
/// lists.
pub fn join_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Convert a unix timestamp (seconds) into a UTC datetime.
pub fn from_unix(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// Format a unix timestamp for display. If `use_utc` is true, shows UTC;
/// otherwise converts to the local timezone. Zero (the API's "never") and
/// out-of-range values print as `-`.
pub fn format_timestamp_display(ts: i64, use_utc: bool) -> String {
    let dt = match from_unix(ts) {
        Some(d) if ts > 0 => d,
        _ => return "-".to_string(),
    };
    if use_utc {
        dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        dt.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }
}
