//! Instant parsing and formatting
//!
//! Date-time values travel as ISO-8601 text. On input both offset forms
//! (`2021-03-01T09:30:00Z`, `2021-03-01T10:30:00+01:00`) and the bare OData
//! v2 literal form without an offset (`2021-03-01T09:30:00`, taken as UTC)
//! are accepted. On output instants are normalized to UTC with millisecond
//! precision.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Parse an ISO-8601 date-time string into a UTC instant
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    // Offset-less literal, taken as UTC
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format an instant in the fixed wire form
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc() {
        let instant = parse_instant("2021-03-01T09:30:00Z").unwrap();
        assert_eq!(format_instant(instant), "2021-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_parse_offset_normalizes_to_utc() {
        let offset = parse_instant("2021-03-01T10:30:00+01:00").unwrap();
        let utc = parse_instant("2021-03-01T09:30:00Z").unwrap();
        assert_eq!(offset, utc);
    }

    #[test]
    fn test_parse_bare_literal() {
        let bare = parse_instant("2021-03-01T09:30:00").unwrap();
        let utc = parse_instant("2021-03-01T09:30:00Z").unwrap();
        assert_eq!(bare, utc);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let instant = parse_instant("2021-03-01T09:30:00.250Z").unwrap();
        assert_eq!(format_instant(instant), "2021-03-01T09:30:00.250Z");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_instant("yesterday").is_none());
        assert!(parse_instant("2021-13-99T99:99:99").is_none());
    }
}
