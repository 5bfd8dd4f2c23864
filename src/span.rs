//! Requested date ranges

use chrono::NaiveDate;
use serde::Serialize;

/// Date span validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    /// Start date lies after the end date
    #[error("start date {start} cannot be after end date {end}")]
    Inverted {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// End date lies after today in the publisher's time zone
    #[error("end date {end} is in the future (publisher date is {today}); archives do not exist yet")]
    EndsInFuture {
        /// Requested end date
        end: NaiveDate,
        /// Current date at the publisher
        today: NaiveDate,
    },
}

/// Inclusive range of calendar dates to download.
///
/// Constructed only through [`DateSpan::new`] or [`DateSpan::single`], so
/// `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateSpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateSpan {
    /// Create a span, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SpanError> {
        if start > end {
            return Err(SpanError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Span covering exactly one date
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// First date (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days in the span (always >= 1)
    pub fn day_count(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Whether `date` falls inside the span
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Chronological, inclusive sequence of every date in the span
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count())
    }
}

impl std::fmt::Display for DateSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
