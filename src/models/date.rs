//! Calendar dates on the wire.
//!
//! Clients send either a plain `YYYY-MM-DD` or a full RFC 3339 timestamp from a
//! date picker. Only the calendar date is kept; time-of-day never affects pricing.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serializer};

use crate::errors::ValidationError;

pub const WIRE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, WIRE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(WIRE_FORMAT).to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let date = parse_date("2024-01-04").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_parse_timestamp_keeps_date_part() {
        let date = parse_date("2024-03-10T18:45:00.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(
            parse_date("next tuesday"),
            Err(ValidationError::InvalidDate("next tuesday".to_string()))
        );
    }
}
