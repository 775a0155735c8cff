//! Serde helpers for message timestamps.
//!
//! Timestamps are written as RFC 3339 UTC with microsecond precision
//! (`2024-01-15T10:30:00.123456Z`). Reading also accepts naive ISO-8601
//! values without an offset (`2024-01-15T10:30:00.123456`), which are taken
//! to be UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format a timestamp the way it is stored on the wire.
pub fn format(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a wire timestamp, with or without an offset.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(timestamp))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_format_rfc3339_micros() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format(&ts), "2024-01-15T10:30:00.000000Z");
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let ts = parse("2024-01-15T10:30:00.123456").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_with_offset() {
        let ts = parse("2024-01-15T12:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
