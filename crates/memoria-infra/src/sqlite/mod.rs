//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod chat;
pub mod memory;
pub mod model;
pub mod pool;

use chrono::{DateTime, SecondsFormat, Utc};
use memoria_types::error::RepositoryError;

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC format so stored timestamps compare correctly as text.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<uuid::Uuid, RepositoryError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_datetimes_sort_lexically() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(format_datetime(&earlier) < format_datetime(&later));
        assert!(format_datetime(&earlier).ends_with('Z'));
    }

    #[test]
    fn datetime_roundtrip_keeps_micros() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(&now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
