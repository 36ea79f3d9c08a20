//! Serde helpers for backend timestamps.
//!
//! The backend emits either RFC 3339 strings with an offset or naive ISO
//! 8601 strings (server-local `now()` columns). Naive values are taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse("2024-05-01T12:30:00+02:00").expect("rfc3339 should parse");
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse("2024-05-01T12:30:00.123456").expect("naive should parse");
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 12);

        let spaced = parse("2024-05-01 08:00:00").expect("space separated should parse");
        assert_eq!(spaced.hour(), 8);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("").is_none());
        assert!(parse("yesterday").is_none());
    }
}
