//! # Report Windows
//!
//! Inclusive calendar-date windows and their translation to timestamps.
//!
//! ## Calendar Dates vs Timestamps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Window [2024-01-01, 2024-01-02] at UTC+07:00                           │
//! │                                                                         │
//! │  local   2024-01-01 00:00 ─────────────────────► 2024-01-03 00:00       │
//! │  utc     2023-12-31 17:00 ─────────────────────► 2024-01-02 17:00       │
//! │                  ▲ inclusive                              ▲ exclusive   │
//! │                                                                         │
//! │  A transaction belongs to the window iff its created_at, viewed in the │
//! │  configured offset, falls on one of the window's calendar dates.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// The only accepted date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive calendar-date window with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a window, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// A window covering exactly one day.
    pub fn single_day(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    /// Parses `start_date`/`end_date` parameters in `YYYY-MM-DD` form.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::report::DateRange;
    ///
    /// let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
    /// assert_eq!(range.start().to_string(), "2024-01-01");
    ///
    /// assert!(DateRange::parse("2024-02-01", "2024-01-01").is_err());
    /// assert!(DateRange::parse("01/02/2024", "2024-01-01").is_err());
    /// ```
    pub fn parse(start_date: &str, end_date: &str) -> Result<Self, ReportError> {
        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;
        DateRange::new(start, end)
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Half-open UTC bounds `[from, until)` covering the window's calendar
    /// dates as seen from `offset`.
    pub fn utc_bounds(
        &self,
        offset: FixedOffset,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ReportError> {
        let out_of_range = || ReportError::WindowOutOfRange {
            start: self.start,
            end: self.end,
        };

        let day_after_end = self
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(out_of_range)?;

        let from = local_midnight(offset, self.start).ok_or_else(out_of_range)?;
        let until = local_midnight(offset, day_after_end).ok_or_else(out_of_range)?;
        Ok((from, until))
    }
}

/// Parses a single `YYYY-MM-DD` parameter.
///
/// chrono accepts unpadded fields ("2024-1-1") and skips whitespace, so the
/// value must be exactly ten characters with no surrounding blanks.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ReportError> {
    let invalid = || ReportError::InvalidDateFormat {
        field,
        value: value.to_string(),
    };

    if value.len() != 10 || value.trim() != value {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// The calendar date of `now` in `offset`.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

fn local_midnight(offset: FixedOffset, day: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

// =============================================================================
// Unit Tests
// =============================================================================
