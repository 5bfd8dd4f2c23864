//! # Bhavcopy Downloader Library
//!
//! Downloads the daily end-of-day "bhavcopy" archives published by the
//! National Stock Exchange of India for a range of dates and bundles them
//! into a single ZIP, one entry per trading day.
//!
//! ## Features
//!
//! - **Trading Calendar**: Weekends and exchange holidays are skipped without a request
//! - **Publication Awareness**: A miss for today before the evening upload is reported as pending
//! - **Per-Day Outcomes**: Every date in the range ends with exactly one status
//! - **Bounded Concurrency**: Fetches overlap, outcomes still come out in date order
//! - **Deterministic Output**: Same payloads give a byte-identical bundle
//! - **Cancellation**: Ctrl+C or a run timeout keeps the days fetched so far
//!
//! ## Quick Start
//!
//! ```no_run
//! use bhavcopy_downloader::{DateSpan, HttpArchiveFetcher, RangeOrchestrator, TradingCalendar};
//! use bhavcopy_downloader::calendar::{HolidayTable, PublicationSchedule};
//! use bhavcopy_downloader::report::LogReporter;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let calendar = TradingCalendar::new(HolidayTable::bundled()?, PublicationSchedule::default());
//! let orchestrator = RangeOrchestrator::new(calendar, HttpArchiveFetcher::nse()?);
//!
//! let span = DateSpan::new(
//!     NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
//! )?;
//! let report = orchestrator.run(span, &mut LogReporter).await?;
//! report.archive.write_to("BhavCopy.zip".as_ref())?;
//! println!("{}", report.summary);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`span`] - inclusive date ranges
//! - [`calendar`] - day classification and publication schedule
//! - [`fetcher`] - per-date archive retrieval over HTTP
//! - [`downloader`] - range orchestration and per-day outcomes
//! - [`output`] - the aggregated ZIP and its file names
//! - [`report`] - progress reporting seam
//! - [`config`] - TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Trading calendar and publication schedule
pub mod calendar;

/// CLI command implementations
pub mod cli;

/// Wall-clock abstraction
pub mod clock;

/// Application configuration
pub mod config;

/// Range orchestration
pub mod downloader;

/// Archive fetchers
pub mod fetcher;

/// Prometheus metrics
pub mod metrics;

/// Output archive writers
pub mod output;

/// Progress reporting
pub mod report;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Inclusive date spans
pub mod span;

// Re-export commonly used types
pub use calendar::{DayClass, TradingCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use downloader::{
    FetchOutcome, FetchStatus, Interruption, RangeOrchestrator, RunError, RunReport, RunSummary,
};
pub use fetcher::{ArchiveFetcher, FetchAttempt, HttpArchiveFetcher, Miss, RetryingFetcher};
pub use output::{FinishedArchive, OutputArchive};
pub use report::OutcomeReporter;
pub use span::{DateSpan, SpanError};
