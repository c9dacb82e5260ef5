//! Timestamp utilities
//!
//! Timestamps are persisted as fixed-width RFC 3339 UTC text with
//! microsecond precision, so lexical order in SQL matches time order.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::{Error, Result};

/// Date format accepted for release dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC timestamp, truncated to what storage keeps
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    from_db_string(&to_db_string(&now)).unwrap_or(now)
}

/// Format a timestamp for storage
pub fn to_db_string(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn from_db_string(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp '{}': {}", s, e)))
}

/// Parse a client-supplied release date
///
/// Accepts `YYYY-MM-DD`; full RFC 3339 timestamps are also accepted and
/// reduced to their calendar date.
pub fn parse_release_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| Error::InvalidInput(format!("Invalid release date format: '{}'", s)))
}
