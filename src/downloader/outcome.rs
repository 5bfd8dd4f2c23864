//! Per-date outcomes and run totals

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar::TradingCalendar;
use crate::fetcher::Miss;

/// Why a trading day has no archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Publisher answered with a non-success status
    HttpStatus(u16),
    /// Publisher answered with an empty body
    EmptyBody,
    /// Payload arrived but could not be added to the output archive
    ArchiveWrite(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::HttpStatus(code) => write!(f, "HTTP {code}"),
            UnavailableReason::EmptyBody => write!(f, "empty response body"),
            UnavailableReason::ArchiveWrite(detail) => write!(f, "archive write failed: {detail}"),
        }
    }
}

/// Result of processing one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Archive retrieved and added to the output archive
    Fetched(Bytes),
    /// Fetch missed for today before the expected publication instant
    NotYetPublished {
        /// When the archive is expected to appear
        expected_at: DateTime<Tz>,
    },
    /// Trading day with no archive
    Unavailable(UnavailableReason),
    /// Saturday or Sunday; never fetched
    SkippedWeekend,
    /// Listed holiday; never fetched
    SkippedHoliday(String),
    /// Timeout or transport failure
    TransientError(String),
}

impl FetchStatus {
    /// Short status label for logs, metrics and JSON output
    pub fn label(&self) -> &'static str {
        match self {
            FetchStatus::Fetched(_) => "fetched",
            FetchStatus::NotYetPublished { .. } => "not_yet_published",
            FetchStatus::Unavailable(_) => "unavailable",
            FetchStatus::SkippedWeekend => "skipped_weekend",
            FetchStatus::SkippedHoliday(_) => "skipped_holiday",
            FetchStatus::TransientError(_) => "transient_error",
        }
    }

    /// Calendar skip (no fetch attempted)
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            FetchStatus::SkippedWeekend | FetchStatus::SkippedHoliday(_)
        )
    }

    /// Fetch attempted without a usable archive
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            FetchStatus::NotYetPublished { .. }
                | FetchStatus::Unavailable(_)
                | FetchStatus::TransientError(_)
        )
    }

    /// Archive payload, if fetched
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            FetchStatus::Fetched(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Fetched(bytes) => write!(f, "fetched ({} bytes)", bytes.len()),
            FetchStatus::NotYetPublished { expected_at } => {
                write!(f, "not yet published (expected after {expected_at})")
            }
            FetchStatus::Unavailable(reason) => write!(f, "unavailable ({reason})"),
            FetchStatus::SkippedWeekend => write!(f, "skipped (weekend)"),
            FetchStatus::SkippedHoliday(name) => write!(f, "skipped (holiday: {name})"),
            FetchStatus::TransientError(detail) => write!(f, "transient error ({detail})"),
        }
    }
}

/// Outcome for one date of a span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The date
    pub date: NaiveDate,
    /// What happened
    pub status: FetchStatus,
}

impl FetchOutcome {
    /// Pair a date with its status
    pub fn new(date: NaiveDate, status: FetchStatus) -> Self {
        Self { date, status }
    }
}

/// Decide what a fetch miss on `date` means at instant `now`.
///
/// - Today (publisher zone) before the expected publication instant:
///   [`FetchStatus::NotYetPublished`]
/// - A server answer (status or empty body): [`FetchStatus::Unavailable`]
/// - No answer (timeout or transport): [`FetchStatus::TransientError`]
pub fn classify_miss(
    calendar: &TradingCalendar,
    date: NaiveDate,
    miss: &Miss,
    now: DateTime<Utc>,
) -> FetchStatus {
    if date == calendar.today(now) {
        let expected_at = calendar.expected_publication(date);
        if now < expected_at {
            return FetchStatus::NotYetPublished { expected_at };
        }
    }

    match miss {
        Miss::Status(code) => FetchStatus::Unavailable(UnavailableReason::HttpStatus(*code)),
        Miss::EmptyBody => FetchStatus::Unavailable(UnavailableReason::EmptyBody),
        Miss::Timeout(detail) | Miss::Transport(detail) => {
            FetchStatus::TransientError(detail.clone())
        }
    }
}

/// How a run ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interruption {
    /// Shutdown was requested
    Cancelled,
    /// The run timeout elapsed
    TimedOut,
}

impl std::fmt::Display for Interruption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interruption::Cancelled => write!(f, "cancelled"),
            Interruption::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Totals for one run.
///
/// `total_days == fetched_count + skipped_count + unavailable_count`, where
/// `unavailable_count` counts every attempted date without an archive. The
/// breakdown fields split the skips and misses further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Dates settled
    pub total_days: usize,
    /// Archives added to the output
    pub fetched_count: usize,
    /// Weekend and holiday dates
    pub skipped_count: usize,
    /// Attempted dates without an archive
    pub unavailable_count: usize,
    /// Of `skipped_count`, weekends
    pub weekend_count: usize,
    /// Of `skipped_count`, holidays
    pub holiday_count: usize,
    /// Of `unavailable_count`, today's not-yet-published archive
    pub not_yet_published_count: usize,
    /// Of `unavailable_count`, timeouts and transport failures
    pub transient_error_count: usize,
}

impl RunSummary {
    /// Count one outcome
    pub fn record(&mut self, status: &FetchStatus) {
        self.total_days += 1;
        match status {
            FetchStatus::Fetched(_) => self.fetched_count += 1,
            FetchStatus::SkippedWeekend => {
                self.skipped_count += 1;
                self.weekend_count += 1;
            }
            FetchStatus::SkippedHoliday(_) => {
                self.skipped_count += 1;
                self.holiday_count += 1;
            }
            FetchStatus::NotYetPublished { .. } => {
                self.unavailable_count += 1;
                self.not_yet_published_count += 1;
            }
            FetchStatus::TransientError(_) => {
                self.unavailable_count += 1;
                self.transient_error_count += 1;
            }
            FetchStatus::Unavailable(_) => self.unavailable_count += 1,
        }
    }

    /// Totals for a slice of outcomes
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a FetchOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(&outcome.status);
        }
        summary
    }

    /// Trading days attempted
    pub fn attempted(&self) -> usize {
        self.fetched_count + self.unavailable_count
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} dates: {} fetched, {} skipped, {} unavailable",
            self.total_days, self.fetched_count, self.skipped_count, self.unavailable_count
        )
    }
}
