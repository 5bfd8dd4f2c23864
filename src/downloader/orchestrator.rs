//! Range orchestration
//!
//! Expands a [`DateSpan`] into days, gates each day through the
//! [`TradingCalendar`], fetches the trading days and aggregates the payloads
//! into one [`OutputArchive`].
//!
//! Fetches run through an order-preserving buffered stream: up to
//! `concurrency` requests are in flight, but outcomes always come out in date
//! order. The archive is owned by the single loop consuming that stream, so
//! entry insertion needs no locking.

use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use super::config::OrchestratorConfig;
use super::outcome::{
    classify_miss, FetchOutcome, FetchStatus, Interruption, RunSummary, UnavailableReason,
};
use super::RunError;
use crate::calendar::{DayClass, TradingCalendar};
use crate::clock::{Clock, SystemClock};
use crate::fetcher::{ArchiveFetcher, FetchAttempt};
use crate::metrics;
use crate::output::{FinishedArchive, OutputArchive};
use crate::report::{OutcomeReporter, Progress};
use crate::shutdown::SharedShutdown;
use crate::span::{DateSpan, SpanError};

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Sealed archive of every fetched day
    pub archive: FinishedArchive,
    /// Totals
    pub summary: RunSummary,
    /// One outcome per settled day, in date order
    pub outcomes: Vec<FetchOutcome>,
    /// Set when the run stopped before the end of the span
    pub interruption: Option<Interruption>,
}

impl RunReport {
    /// Whether every day of the span was settled
    pub fn is_complete(&self) -> bool {
        self.interruption.is_none()
    }
}

/// A day after calendar gating and, for trading days, one fetch
enum Resolved {
    Skipped(FetchStatus),
    Attempted(FetchAttempt),
}

/// Downloads and bundles the archives for a span of dates
pub struct RangeOrchestrator {
    calendar: Arc<TradingCalendar>,
    fetcher: Arc<dyn ArchiveFetcher>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
    shutdown: Option<SharedShutdown>,
}

impl std::fmt::Debug for RangeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeOrchestrator")
            .field("calendar", &self.calendar)
            .field("config", &self.config)
            .field("shutdown", &self.shutdown.is_some())
            .finish()
    }
}

impl RangeOrchestrator {
    /// Orchestrator using the system clock and default settings
    pub fn new<F>(calendar: TradingCalendar, fetcher: F) -> Self
    where
        F: ArchiveFetcher + 'static,
    {
        Self {
            calendar: Arc::new(calendar),
            fetcher: Arc::new(fetcher),
            clock: Arc::new(SystemClock),
            config: OrchestratorConfig::default(),
            shutdown: None,
        }
    }

    /// Read "now" from `clock`
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace all knobs at once
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Allow up to `concurrency` fetches in flight
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Stop the run after `timeout` of wall-clock time
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.config.run_timeout = Some(timeout);
        self
    }

    /// Cap the payload bytes aggregated into the archive
    pub fn with_max_archive_bytes(mut self, max_bytes: u64) -> Self {
        self.config.max_archive_bytes = Some(max_bytes);
        self
    }

    /// Stop the run when `shutdown` is requested
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Calendar in use
    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    /// Knobs in use
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Download every trading day of `span` into one archive.
    ///
    /// Fails before any network activity if the span ends after today in
    /// the publisher's time zone. Per-day failures never fail the run; they
    /// become outcomes. Cancellation and the run timeout return the partial
    /// archive with [`RunReport::interruption`] set.
    pub async fn run<R>(&self, span: DateSpan, reporter: &mut R) -> Result<RunReport, RunError>
    where
        R: OutcomeReporter + ?Sized,
    {
        let today = self.calendar.today(self.clock.now());
        if span.end() > today {
            return Err(SpanError::EndsInFuture {
                end: span.end(),
                today,
            }
            .into());
        }

        let run_span = info_span!(
            "range_run",
            start = %span.start(),
            end = %span.end(),
            days = span.day_count()
        );
        self.execute(span, reporter).instrument(run_span).await
    }

    async fn execute<R>(&self, span: DateSpan, reporter: &mut R) -> Result<RunReport, RunError>
    where
        R: OutcomeReporter + ?Sized,
    {
        self.warn_uncovered_years(&span);

        let concurrency = self.config.effective_concurrency();
        let total = span.day_count();
        info!(
            %span,
            total,
            concurrency,
            fetcher = %self.fetcher.locator(span.start()),
            "Starting range run"
        );

        let mut archive = OutputArchive::new();
        if let Some(max_bytes) = self.config.max_archive_bytes {
            archive = archive.with_max_bytes(max_bytes);
        }

        let calendar = self.calendar.as_ref();
        let fetcher = self.fetcher.as_ref();
        let days = stream::iter(span.days())
            .map(move |date| async move {
                let resolved = match calendar.classify(date).class {
                    DayClass::Weekend => Resolved::Skipped(FetchStatus::SkippedWeekend),
                    DayClass::Holiday(name) => Resolved::Skipped(FetchStatus::SkippedHoliday(name)),
                    DayClass::TradingDay => Resolved::Attempted(fetcher.fetch(date).await),
                };
                (date, resolved)
            })
            .buffered(concurrency);

        let deadline = self.config.run_timeout.map(|timeout| Instant::now() + timeout);
        let timed_out = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        let cancelled = async {
            match &self.shutdown {
                Some(shutdown) => shutdown.wait_for_shutdown().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(days);
        tokio::pin!(timed_out);
        tokio::pin!(cancelled);

        let mut outcomes = Vec::with_capacity(total);
        let mut summary = RunSummary::default();
        let mut interruption = None;

        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => {
                    info!(settled = outcomes.len(), total, "Shutdown requested, stopping run");
                    interruption = Some(Interruption::Cancelled);
                    break;
                }
                _ = &mut timed_out => {
                    warn!(settled = outcomes.len(), total, "Run timeout elapsed, stopping run");
                    interruption = Some(Interruption::TimedOut);
                    break;
                }
                next = days.next() => {
                    let Some((date, resolved)) = next else { break };
                    let status = self.settle(&mut archive, date, resolved);
                    metrics::record_outcome(status.label());
                    summary.record(&status);

                    let outcome = FetchOutcome::new(date, status);
                    let progress = Progress {
                        index: outcomes.len() + 1,
                        total,
                    };
                    reporter.on_outcome(progress, &outcome);
                    outcomes.push(outcome);
                }
            }
        }

        let archive = archive.finish()?;

        if summary.fetched_count == 0 {
            warn!(%span, "No archives were retrieved for the requested span");
        }
        info!(
            total_days = summary.total_days,
            fetched = summary.fetched_count,
            skipped = summary.skipped_count,
            unavailable = summary.unavailable_count,
            archive_bytes = archive.bytes().len(),
            "Range run finished"
        );

        let result = match interruption {
            None => "completed",
            Some(Interruption::Cancelled) => "cancelled",
            Some(Interruption::TimedOut) => "timed_out",
        };
        metrics::record_run(&summary, result);
        reporter.on_finish(&summary, interruption);

        Ok(RunReport {
            archive,
            summary,
            outcomes,
            interruption,
        })
    }

    /// Turn a resolved day into its final status, writing payloads into the archive
    fn settle(&self, archive: &mut OutputArchive, date: NaiveDate, resolved: Resolved) -> FetchStatus {
        match resolved {
            Resolved::Skipped(status) => {
                debug!(%date, status = status.label(), "Skipping non-trading day");
                status
            }
            Resolved::Attempted(FetchAttempt::Payload(payload)) => {
                match archive.add(date, &payload) {
                    Ok(entry) => {
                        debug!(%date, %entry, bytes = payload.len(), "Archive aggregated");
                        FetchStatus::Fetched(payload)
                    }
                    Err(e) => {
                        warn!(%date, error = %e, "Failed to add archive to output");
                        FetchStatus::Unavailable(UnavailableReason::ArchiveWrite(e.to_string()))
                    }
                }
            }
            Resolved::Attempted(FetchAttempt::Miss(miss)) => {
                let status = classify_miss(&self.calendar, date, &miss, self.clock.now());
                if let FetchStatus::TransientError(_) = status {
                    warn!(
                        %date,
                        url = %self.fetcher.locator(date),
                        error = %miss,
                        "Transient fetch failure"
                    );
                } else {
                    info!(%date, %miss, status = status.label(), "No archive for trading day");
                }
                status
            }
        }
    }

    fn warn_uncovered_years(&self, span: &DateSpan) {
        let holidays = self.calendar.holidays();
        for year in span.start().year()..=span.end().year() {
            if !holidays.covers_year(year) {
                warn!(
                    year,
                    table = holidays.label(),
                    "Holiday table does not cover this year; holidays will be fetched as trading days"
                );
            }
        }
    }
}
