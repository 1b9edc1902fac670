//! Common utilities and helper functions

pub mod retry;

use chrono::{SecondsFormat, Utc};

/// Today's date in UTC as `YYYY-MM-DD`
pub fn utc_today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Current UTC time as RFC 3339 with a `Z` suffix
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Check a `YYYY-MM-DD` date string
pub fn is_valid_radar_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Truncate text to a maximum length (in characters)
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
