//! Conversions between LogBlock's reported date/time fields and epoch millis.
//!
//! All instants are interpreted on the UTC calendar so that a saved record
//! reproduces the exact fields it was parsed from, independent of the host
//! time zone.

use crate::{EditStoreError, Result};
use chrono::{DateTime, Datelike, NaiveDate, Timelike};

/// Calendar date as reported in a result line. `year` is `None` when the
/// server is configured not to print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportedDate {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl ReportedDate {
    /// Full year, substituting `default_year` when none was reported.
    pub fn year_or(&self, default_year: i32) -> i32 {
        self.year.unwrap_or(default_year)
    }
}

/// Calendar fields of a stored instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Parse a year field. Two-digit years are taken to be in 2000-2099.
pub fn parse_year(text: &str) -> Result<i32> {
    let trimmed = text.trim();
    let value: i32 = trimmed
        .parse()
        .map_err(|err| EditStoreError::invalid_timestamp(format!("year {trimmed:?}: {err}")))?;
    if trimmed.len() <= 2 {
        Ok(2000 + value)
    } else {
        Ok(value)
    }
}

/// Convert calendar fields to milliseconds since the Unix epoch.
pub fn to_millis(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        EditStoreError::invalid_timestamp(format!("no such date {year:04}-{month:02}-{day:02}"))
    })?;
    let instant = date.and_hms_opt(hour, minute, second).ok_or_else(|| {
        EditStoreError::invalid_timestamp(format!("no such time {hour:02}:{minute:02}:{second:02}"))
    })?;
    Ok(instant.and_utc().timestamp_millis())
}

/// Split milliseconds since the epoch back into calendar fields.
pub fn from_millis(millis: i64) -> Result<DateTimeFields> {
    let instant = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| EditStoreError::invalid_timestamp(format!("out of range: {millis}")))?;
    Ok(DateTimeFields {
        year: instant.year(),
        month: instant.month(),
        day: instant.day(),
        hour: instant.hour(),
        minute: instant.minute(),
        second: instant.second(),
    })
}

/// Year of the given instant on the UTC calendar.
pub fn year_of(millis: i64) -> Option<i32> {
    DateTime::from_timestamp_millis(millis).map(|instant| instant.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_years_are_2000_based() {
        assert_eq!(parse_year("20").unwrap(), 2020);
        assert_eq!(parse_year("07").unwrap(), 2007);
        assert_eq!(parse_year("2019").unwrap(), 2019);
        assert!(parse_year("x1").is_err());
    }

    #[test]
    fn millis_round_trip_keeps_fields() {
        let millis = to_millis(2020, 1, 2, 3, 4, 5).unwrap();
        let fields = from_millis(millis).unwrap();
        assert_eq!(
            fields,
            DateTimeFields {
                year: 2020,
                month: 1,
                day: 2,
                hour: 3,
                minute: 4,
                second: 5,
            }
        );
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(to_millis(2021, 2, 29, 0, 0, 0).is_err());
        assert!(to_millis(2021, 13, 1, 0, 0, 0).is_err());
        assert!(to_millis(2021, 1, 1, 24, 0, 0).is_err());
    }

    #[test]
    fn missing_year_uses_default() {
        let date = ReportedDate {
            year: None,
            month: 6,
            day: 1,
        };
        assert_eq!(date.year_or(2024), 2024);
        let date = ReportedDate {
            year: Some(2019),
            ..date
        };
        assert_eq!(date.year_or(2024), 2019);
    }
}
