//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range for queries and reports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the range, both ends included
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Range covering the calendar month that contains `date`
    pub fn month_of(date: NaiveDate) -> Self {
        use chrono::Datelike;

        let start = date.with_day(1).unwrap_or(date);
        let (next_year, next_month) = if date.month() == 12 {
            (date.year() + 1, 1)
        } else {
            (date.year(), date.month() + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(date);

        Self { start, end }
    }
}

/// Optional date filter used by list endpoints
///
/// Either bound may be missing; a missing bound is open-ended.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<DateRange> for DateFilter {
    fn from(range: DateRange) -> Self {
        Self { start_date: Some(range.start), end_date: Some(range.end) }
    }
}

impl DateFilter {
    /// Lower bound, falling back to a date earlier than any record
    pub fn start_or_min(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN))
    }

    /// Upper bound, falling back to a date later than any record
    pub fn end_or_max(&self) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2100, 12, 31).unwrap_or(NaiveDate::MAX))
    }
}
