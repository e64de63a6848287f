//! Row-to-entity parsing helpers.
//!
//! Converts `libsql::Row` (column-indexed) into typed values. Timestamps are
//! written with a fixed RFC 3339 shape (`...T..:..:..ssssssZ`) so that text
//! comparison in SQL orders them chronologically.

use chrono::{DateTime, SecondsFormat, Utc};

use td_core::enums::TaskPriority;

use crate::error::DatabaseError;

/// Format a timestamp for storage.
#[must_use]
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all td-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Decode the integer priority rank stored in the `priority` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for ranks outside `0..=3`.
pub fn parse_priority(rank: i64) -> Result<TaskPriority, DatabaseError> {
    TaskPriority::from_rank(rank)
        .ok_or_else(|| DatabaseError::Query(format!("Unknown priority rank {rank}")))
}

/// Read a nullable TEXT column.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use td_core::enums::TaskStatus;

    #[test]
    fn formatted_datetimes_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_datetime(&format_datetime(dt)).unwrap(), dt);
    }

    #[test]
    fn formatted_datetimes_sort_as_text() {
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 11, 12, 23, 0, 5).unwrap();
        assert!(format_datetime(early) < format_datetime(late));
    }

    #[test]
    fn parses_sqlite_default_format() {
        let dt = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap());
    }

    #[test]
    fn optional_datetime_treats_empty_as_none() {
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
        assert_eq!(parse_optional_datetime(None).unwrap(), None);
    }

    #[test]
    fn parse_enum_reads_snake_case() {
        let status: TaskStatus = parse_enum("on_hold").unwrap();
        assert_eq!(status, TaskStatus::OnHold);
        assert!(parse_enum::<TaskStatus>("archived").is_err());
    }

    #[test]
    fn parse_priority_rejects_unknown_rank() {
        assert_eq!(parse_priority(3).unwrap(), TaskPriority::Critical);
        assert!(parse_priority(9).is_err());
    }
}
