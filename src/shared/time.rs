use super::errors::{BotError, BotResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> BotResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| BotError::validation("Invalid date format! Use YYYY-MM-DD."))
}

/// Parses a `YYYY-MM-DD HH:MM` date-time.
pub fn parse_datetime(input: &str) -> BotResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .map_err(|_| BotError::validation("Invalid datetime format! Use YYYY-MM-DD HH:MM."))
}

/// Canonical `YYYY-MM-DD` key for a date.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `YYYY-MM` key used for monthly budgets.
pub fn month_key(date: impl Datelike) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Serde adapter for `YYYY-MM-DD HH:MM` timestamps.
pub mod minute_format {
    use super::DATETIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_valid_and_invalid() {
        assert!(parse_date("2025-07-10").is_ok());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("10/07/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_datetime_requires_minutes() {
        assert!(parse_datetime("2025-07-10 14:30").is_ok());
        assert!(parse_datetime("2025-07-10").is_err());
        assert!(parse_datetime("2025-07-10 25:00").is_err());
    }

    #[test]
    fn test_month_key_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        assert_eq!(month_key(date), "2024-07");
        assert_eq!(date_key(date), "2024-07-03");
    }
}
