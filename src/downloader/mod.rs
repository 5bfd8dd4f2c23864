//! Range downloads
//!
//! Turns a date span into one bundled archive.
//!
//! # Overview
//!
//! 1. **Gating**: each day is classified by the [`crate::calendar::TradingCalendar`];
//!    weekends and holidays are skipped without a network call
//! 2. **Fetching**: trading days go through an [`crate::fetcher::ArchiveFetcher`],
//!    one at a time or through a bounded, order-preserving pool
//! 3. **Classification**: misses become [`FetchStatus::NotYetPublished`],
//!    [`FetchStatus::Unavailable`] or [`FetchStatus::TransientError`]
//! 4. **Aggregation**: payloads are written into an [`crate::output::OutputArchive`]
//! 5. **Reporting**: outcomes stream to an [`crate::report::OutcomeReporter`] in date order
//!
//! # Quick Start
//!
//! ```no_run
//! use bhavcopy_downloader::calendar::TradingCalendar;
//! use bhavcopy_downloader::downloader::RangeOrchestrator;
//! use bhavcopy_downloader::fetcher::HttpArchiveFetcher;
//! use bhavcopy_downloader::report::LogReporter;
//! use bhavcopy_downloader::DateSpan;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = RangeOrchestrator::new(
//!     TradingCalendar::weekends_only(),
//!     HttpArchiveFetcher::nse()?,
//! );
//! let span = DateSpan::new(
//!     NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
//! )?;
//!
//! let report = orchestrator.run(span, &mut LogReporter).await?;
//! report.archive.write_to("BhavCopy_Pro.zip".as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`orchestrator`] - the range run
//! - [`outcome`] - per-day statuses, miss classification and run totals
//! - [`config`] - concurrency, timeout and retry knobs

pub mod config;
pub mod orchestrator;
pub mod outcome;

pub use config::{OrchestratorConfig, RetryPolicy};
pub use orchestrator::{RangeOrchestrator, RunReport};
pub use outcome::{
    classify_miss, FetchOutcome, FetchStatus, Interruption, RunSummary, UnavailableReason,
};

use crate::output::OutputError;
use crate::span::SpanError;

/// Run errors.
///
/// Per-day failures are outcomes, not errors; a run fails only on invalid
/// input or when the finished archive cannot be sealed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Requested span is not acceptable
    #[error("invalid date span: {0}")]
    Validation(#[from] SpanError),

    /// Output archive could not be sealed
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}
