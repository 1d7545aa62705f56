//! Calendar date ranges.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::ConfigError;

/// Date format accepted everywhere a date is configured.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar days with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse both ends from `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// First day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, counting both ends.
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Iterate every day in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

/// Day of week with Sunday = 0.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// Whether the date falls on Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(weekday_index(date), 0 | 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_num_days_inclusive() {
        let range = DateRange::parse("2024-01-01", "2024-12-31").unwrap();
        assert_eq!(range.num_days(), 366);
        assert_eq!(range.days().count(), 366);

        let single = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        assert_eq!(single.num_days(), 1);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::parse("2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { .. }));
    }

    #[test]
    fn test_unparsable_date_rejected() {
        assert!(matches!(parse_date("2024-13-01"), Err(ConfigError::InvalidDate(_))));
        assert!(matches!(parse_date("01/02/2024"), Err(ConfigError::InvalidDate(_))));
    }

    #[test]
    fn test_weekday_helpers() {
        // 2024-01-01 was a Monday
        assert_eq!(weekday_index(d("2024-01-01")), 1);
        assert_eq!(weekday_index(d("2023-12-31")), 0);
        assert!(is_weekend(d("2024-01-06")));
        assert!(!is_weekend(d("2024-01-05")));
    }
}
