//! Session identity and timestamps for annotating saved work.

use chrono::{DateTime, Local, TimeZone};
use once_cell::sync::Lazy;

/// Login name of the user running this process.
pub static USERNAME: Lazy<String> = Lazy::new(|| {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
});

/// Name of the host this process runs on.
pub static HOSTNAME: Lazy<String> = Lazy::new(|| {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
});

const TIME_FORMAT: &str = "%H:%M on %Y-%m-%d";

/// The current wall-clock time, formatted for display.
pub fn formatted_time() -> String {
    format_time(Local::now())
}

/// A unix timestamp formatted for display, if it is representable.
pub fn formatted_timestamp(timestamp: i64) -> Option<String> {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(format_time)
}

fn format_time(when: DateTime<Local>) -> String {
    when.format(TIME_FORMAT).to_string()
}
