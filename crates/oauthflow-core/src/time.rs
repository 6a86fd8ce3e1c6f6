//! Date windows for calendar queries.
//!
//! The calendar page takes `start` and `end` as plain `YYYY-MM-DD` dates and
//! turns them into a closed UTC window covering both days in full:
//! `start T00:00:00Z` up to `end T23:59:59Z`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format accepted in query strings.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced while turning query parameters into a [`DateWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// A date did not match `YYYY-MM-DD`.
    #[error("invalid {field} date {value:?}, expected YYYY-MM-DD")]
    InvalidDate {
        /// Which query parameter was malformed.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// The end date precedes the start date.
    #[error("end date {end} is before start date {start}")]
    Inverted {
        /// Parsed start date.
        start: NaiveDate,
        /// Parsed end date.
        end: NaiveDate,
    },
}

/// An inclusive range of whole UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day of the window.
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window covering a single day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Builds a window from raw `start`/`end` query values.
    ///
    /// When either value is missing or blank both sides fall back to `today`.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, WindowError> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());

        match (start, end) {
            (Some(start), Some(end)) => {
                let start = parse_query_date("start", start)?;
                let end = parse_query_date("end", end)?;
                Self::new(start, end)
            }
            _ => Ok(Self::single_day(today)),
        }
    }

    /// Lower bound of the window: midnight UTC on the start day.
    pub fn time_min(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Upper bound of the window: 23:59:59 UTC on the end day.
    pub fn time_max(&self) -> DateTime<Utc> {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.end.and_time(last_second).and_utc()
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            format_utc(self.time_min()),
            format_utc(self.time_max())
        )
    }
}

/// Parses a `YYYY-MM-DD` query value.
pub fn parse_query_date(field: &'static str, value: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(value, QUERY_DATE_FORMAT).map_err(|_| WindowError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Formats a UTC timestamp the way Google APIs expect it: `2024-01-01T00:00:00Z`.
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
