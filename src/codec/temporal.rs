//! Date, datetime and time parsing for the temporal validation types.
//!
//! Each validation tag pins one explicit chrono format string; parsing never
//! guesses among formats, so a value that round-trips under one tag is
//! guaranteed to re-parse to the same instant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DictionaryError, Result};

/// Day/month/year ordering of a date-bearing validation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `%d-%m-%Y`
    Dmy,
    /// `%m-%d-%Y`
    Mdy,
    /// `%Y-%m-%d`
    Ymd,
}

impl DateOrder {
    /// chrono format string for the date portion
    #[must_use]
    pub const fn date_format(self) -> &'static str {
        match self {
            Self::Dmy => "%d-%m-%Y",
            Self::Mdy => "%m-%d-%Y",
            Self::Ymd => "%Y-%m-%d",
        }
    }

    /// chrono format string for the datetime portion, with or without seconds
    #[must_use]
    pub const fn datetime_format(self, seconds: bool) -> &'static str {
        match (self, seconds) {
            (Self::Dmy, false) => "%d-%m-%Y %H:%M",
            (Self::Mdy, false) => "%m-%d-%Y %H:%M",
            (Self::Ymd, false) => "%Y-%m-%d %H:%M",
            (Self::Dmy, true) => "%d-%m-%Y %H:%M:%S",
            (Self::Mdy, true) => "%m-%d-%Y %H:%M:%S",
            (Self::Ymd, true) => "%Y-%m-%d %H:%M:%S",
        }
    }
}

fn malformed(raw: &str, tag: &str) -> DictionaryError {
    DictionaryError::MalformedValue {
        raw: raw.to_string(),
        tag: tag.to_string(),
    }
}

pub fn parse_date(raw: &str, order: DateOrder, tag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), order.date_format()).map_err(|_| malformed(raw, tag))
}

pub fn parse_datetime(raw: &str, order: DateOrder, seconds: bool, tag: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), order.datetime_format(seconds))
        .map_err(|_| malformed(raw, tag))
}

pub fn parse_time(raw: &str, format: &'static str, tag: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), format).map_err(|_| malformed(raw, tag))
}

/// `mm:ss` values land in the minute/second positions of a midnight-based
/// `NaiveTime`, so they stay ordered and round-trippable. chrono refuses to
/// build a time without an hour, hence the `00:` prefix.
pub fn parse_minutes_seconds(raw: &str, tag: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(&format!("00:{}", raw.trim()), "%H:%M:%S")
        .map_err(|_| malformed(raw, tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_ordering_parses_its_own_layout() {
        assert_eq!(
            parse_date("25-12-2023", DateOrder::Dmy, "date_dmy").unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
        assert_eq!(
            parse_date("12-25-2023", DateOrder::Mdy, "date_mdy").unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
        assert_eq!(
            parse_date("2023-12-25", DateOrder::Ymd, "date_ymd").unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
    }

    #[test]
    fn seconds_variant_requires_seconds() {
        assert!(parse_datetime("25-12-2023 10:30:00", DateOrder::Dmy, true, "t").is_ok());
        assert!(parse_datetime("25-12-2023 10:30", DateOrder::Dmy, true, "t").is_err());
    }

    #[test]
    fn minutes_seconds_parse_without_an_hour() {
        let t = parse_minutes_seconds("05:30", "time_mm_ss").unwrap();
        assert_eq!(t.format("%M:%S").to_string(), "05:30");
        assert!(parse_minutes_seconds("5:30:00", "time_mm_ss").is_err());
    }

    #[test]
    fn wrong_ordering_is_malformed() {
        let err = parse_date("2023-12-25", DateOrder::Dmy, "date_dmy").unwrap_err();
        assert!(matches!(err, DictionaryError::MalformedValue { .. }));
    }
}
