//! Trading calendar: which days have an archive, and when it appears.
//!
//! # Classification
//!
//! 1. Saturday and Sunday are [`DayClass::Weekend`]. This check runs first.
//! 2. Dates listed in the [`HolidayTable`] are [`DayClass::Holiday`].
//! 3. Everything else is a [`DayClass::TradingDay`].
//!
//! Only trading days are ever fetched.
//!
//! # Publication instant
//!
//! The publisher uploads each day's archive after the close. The
//! [`PublicationSchedule`] holds that local time-of-day and the publisher's
//! time zone; a fetch miss for *today* before that instant is reported as
//! "not yet published" rather than "unavailable".

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod holidays;

pub use holidays::{HolidayEntry, HolidayError, HolidayTable};

/// Default local time after which an archive is expected
pub const DEFAULT_PUBLICATION_TIME: &str = "18:30";

/// Default publisher time zone
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Calendar configuration errors
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// Publication time is not `HH:MM` or `HH:MM:SS`
    #[error("invalid publication time '{0}': expected HH:MM")]
    InvalidTime(String),

    /// Unknown IANA time zone name
    #[error("invalid time zone '{name}': {reason}")]
    InvalidTimezone {
        /// Name as configured
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Classification of a single calendar date
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DayClass {
    /// Publisher is expected to issue an archive
    TradingDay,
    /// Saturday or Sunday
    Weekend,
    /// Listed holiday with its occasion name
    Holiday(String),
}

impl DayClass {
    /// Whether an archive should exist for this day
    pub fn is_trading(&self) -> bool {
        matches!(self, DayClass::TradingDay)
    }
}

impl std::fmt::Display for DayClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayClass::TradingDay => write!(f, "trading day"),
            DayClass::Weekend => write!(f, "weekend"),
            DayClass::Holiday(name) => write!(f, "holiday ({name})"),
        }
    }
}

/// A date together with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    /// The classified date
    pub date: NaiveDate,
    /// Its classification
    pub class: DayClass,
}

/// Schedule configuration as written in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local time-of-day, `HH:MM`
    pub publication_time: String,
    /// IANA time zone name
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            publication_time: DEFAULT_PUBLICATION_TIME.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// When a trading day's archive is expected to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationSchedule {
    time_of_day: NaiveTime,
    timezone: Tz,
}

impl PublicationSchedule {
    /// Create from an explicit time and zone
    pub fn new(time_of_day: NaiveTime, timezone: Tz) -> Self {
        Self {
            time_of_day,
            timezone,
        }
    }

    /// Parse `HH:MM` (or `HH:MM:SS`) and an IANA zone name
    pub fn parse(time_of_day: &str, timezone: &str) -> Result<Self, CalendarError> {
        let time_of_day = NaiveTime::parse_from_str(time_of_day, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time_of_day, "%H:%M:%S"))
            .map_err(|_| CalendarError::InvalidTime(time_of_day.to_string()))?;
        let timezone = timezone
            .parse::<Tz>()
            .map_err(|e| CalendarError::InvalidTimezone {
                name: timezone.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(time_of_day, timezone))
    }

    /// Build from the TOML representation
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, CalendarError> {
        Self::parse(&config.publication_time, &config.timezone)
    }

    /// Local publication time-of-day
    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    /// Publisher time zone
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Default for PublicationSchedule {
    fn default() -> Self {
        // 18:30 Asia/Kolkata
        Self::new(
            NaiveTime::from_hms_opt(18, 30, 0).unwrap_or(NaiveTime::MIN),
            chrono_tz::Asia::Kolkata,
        )
    }
}

/// Classifies dates and computes expected publication instants.
///
/// Holds its reference data behind an [`Arc`], so clones are cheap and can
/// be shared across concurrent fetch tasks.
#[derive(Debug, Clone)]
pub struct TradingCalendar {
    holidays: Arc<HolidayTable>,
    schedule: PublicationSchedule,
}

impl TradingCalendar {
    /// Create a calendar from a holiday table and publication schedule
    pub fn new(holidays: HolidayTable, schedule: PublicationSchedule) -> Self {
        Self {
            holidays: Arc::new(holidays),
            schedule,
        }
    }

    /// Calendar with weekends only: no holidays, default schedule
    pub fn weekends_only() -> Self {
        Self::new(HolidayTable::empty(), PublicationSchedule::default())
    }

    /// Classify `date`
    pub fn classify(&self, date: NaiveDate) -> CalendarDay {
        let class = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayClass::Weekend
        } else if let Some(name) = self.holidays.lookup(date) {
            DayClass::Holiday(name.to_string())
        } else {
            DayClass::TradingDay
        };
        CalendarDay { date, class }
    }

    /// Instant after which the archive for `date` is expected to exist
    pub fn expected_publication(&self, date: NaiveDate) -> DateTime<Tz> {
        let tz = self.schedule.timezone;
        let local = date.and_time(self.schedule.time_of_day);
        tz.from_local_datetime(&local)
            .earliest()
            // DST gap: the wall-clock time does not exist, so publication
            // moves to the first valid instant after it.
            .or_else(|| {
                tz.from_local_datetime(&(local + chrono::Duration::hours(1)))
                    .earliest()
            })
            .unwrap_or_else(|| tz.from_utc_datetime(&local))
    }

    /// Calendar date at the publisher for the instant `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.schedule.timezone).date_naive()
    }

    /// Underlying holiday table
    pub fn holidays(&self) -> &HolidayTable {
        &self.holidays
    }

    /// Publication schedule
    pub fn schedule(&self) -> &PublicationSchedule {
        &self.schedule
    }
}
