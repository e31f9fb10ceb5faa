//! Timestamp helpers.
//!
//! Timestamps are stored as UTC text in `YYYY-MM-DD HH:MM:SS` form so that
//! SQLite and PostgreSQL columns sort and compare identically.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a UTC datetime in the storage format.
pub fn to_db_string(dt: &DateTime<Utc>) -> String {
    dt.format(DB_FORMAT).to_string()
}

/// Current time in the storage format.
pub fn now_db_string() -> String {
    to_db_string(&Utc::now())
}

/// Storage-format timestamp `days` days from now.
pub fn days_from_now_db_string(days: i64) -> String {
    to_db_string(&(Utc::now() + Duration::days(days)))
}

/// Convert a stored timestamp to RFC3339 for API responses.
///
/// Strings that are not in the storage format are returned unchanged.
pub fn to_rfc3339(datetime_str: &str) -> String {
    match NaiveDateTime::parse_from_str(datetime_str, DB_FORMAT) {
        Ok(naive) => naive.and_utc().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        Err(_) => datetime_str.to_string(),
    }
}
