//! Report range model.
//!
//! This module contains the [`ReportRange`] type that defines the calendar
//! window of a consolidated report and its UTC boundaries.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// An inclusive range of calendar days covered by a report.
///
/// The range maps onto the UTC half-open interval from `start_date` 00:00
/// to the midnight following `end_date`. Local calendar dates are never
/// consulted.
///
/// # Example
///
/// ```
/// use attendance_engine::models::ReportRange;
/// use chrono::NaiveDate;
///
/// let range = ReportRange::new(
///     NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(range.days().count(), 5);
/// assert!(range.contains_date(NaiveDate::from_ymd_opt(2025, 8, 22).unwrap()));
/// assert!(!range.contains_date(NaiveDate::from_ymd_opt(2025, 8, 23).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRange {
    /// The first day of the report (inclusive).
    start_date: NaiveDate,
    /// The last day of the report (inclusive).
    end_date: NaiveDate,
}

impl ReportRange {
    /// Creates a range, rejecting one that ends before it starts.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// A range covering a single day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start_date: date,
            end_date: date,
        }
    }

    /// The first day of the report.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// The last day of the report.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Checks if a given date falls within the range (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns the UTC boundaries `[start 00:00, day after end 00:00)`.
    ///
    /// Fails only when the end date is the last representable day.
    pub fn utc_bounds(&self) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
        let exclusive_end = self
            .end_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| EngineError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            })?;
        Ok((
            self.start_date.and_time(chrono::NaiveTime::MIN).and_utc(),
            exclusive_end.and_time(chrono::NaiveTime::MIN).and_utc(),
        ))
    }

    /// Checks if an instant falls inside the UTC boundaries of the range.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.contains_date(instant.date_naive())
    }

    /// Iterates over every day of the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end_date;
        self.start_date.iter_days().take_while(move |day| *day <= end)
    }
}
