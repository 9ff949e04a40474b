//! Day boundaries for date-scoped ledger queries.
//!
//! Invoice dates are UTC calendar dates. A day is the half-open interval
//! `[date 00:00 UTC, date+1 00:00 UTC)`; no per-account timezone is applied.

use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    /// Inclusive
    pub start: NaiveDate,
    /// Exclusive
    pub end: NaiveDate,
}

impl DayRange {
    pub fn utc(date: NaiveDate) -> Self {
        Self {
            start: date,
            // Only NaiveDate::MAX has no successor.
            end: date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}
