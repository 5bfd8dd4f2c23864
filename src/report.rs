//! Outcome reporting
//!
//! A run calls [`OutcomeReporter::on_outcome`] once per date, in date order,
//! and [`OutcomeReporter::on_finish`] exactly once at the end (also when the
//! run is cancelled or times out).

use tokio::sync::mpsc;
use tracing::info;

use crate::downloader::{FetchOutcome, Interruption, RunSummary};

/// Position of an outcome within its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position
    pub index: usize,
    /// Dates in the span
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.index as f64 / self.total as f64
    }

    /// Completed percentage
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }
}

/// Receives outcomes as a run settles them
pub trait OutcomeReporter: Send {
    /// One date has been settled
    fn on_outcome(&mut self, progress: Progress, outcome: &FetchOutcome);

    /// The run is over
    fn on_finish(&mut self, _summary: &RunSummary, _interruption: Option<Interruption>) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl OutcomeReporter for NoopReporter {
    fn on_outcome(&mut self, _progress: Progress, _outcome: &FetchOutcome) {}
}

/// Logs each outcome at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl OutcomeReporter for LogReporter {
    fn on_outcome(&mut self, progress: Progress, outcome: &FetchOutcome) {
        info!(
            date = %outcome.date,
            status = outcome.status.label(),
            "[PROGRESS] {}/{} ({:.1}%) {}: {}",
            progress.index,
            progress.total,
            progress.percent(),
            outcome.date,
            outcome.status
        );
    }

    fn on_finish(&mut self, summary: &RunSummary, interruption: Option<Interruption>) {
        match interruption {
            Some(reason) => info!(%reason, "[STOPPED] {summary}"),
            None => info!("[DONE] {summary}"),
        }
    }
}

/// Event forwarded by [`ChannelReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A settled date
    Outcome {
        /// Position in the run
        progress: Progress,
        /// The outcome
        outcome: FetchOutcome,
    },
    /// End of run
    Finished {
        /// Run totals
        summary: RunSummary,
        /// Early stop, if any
        interruption: Option<Interruption>,
    },
}

/// Forwards events over an unbounded channel, e.g. to a UI task.
///
/// A closed receiver is ignored; reporting never fails a run.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ReportEvent>,
}

impl ChannelReporter {
    /// Reporter and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutcomeReporter for ChannelReporter {
    fn on_outcome(&mut self, progress: Progress, outcome: &FetchOutcome) {
        let _ = self.tx.send(ReportEvent::Outcome {
            progress,
            outcome: outcome.clone(),
        });
    }

    fn on_finish(&mut self, summary: &RunSummary, interruption: Option<Interruption>) {
        let _ = self.tx.send(ReportEvent::Finished {
            summary: summary.clone(),
            interruption,
        });
    }
}

impl<R: OutcomeReporter + ?Sized> OutcomeReporter for &mut R {
    fn on_outcome(&mut self, progress: Progress, outcome: &FetchOutcome) {
        (**self).on_outcome(progress, outcome)
    }

    fn on_finish(&mut self, summary: &RunSummary, interruption: Option<Interruption>) {
        (**self).on_finish(summary, interruption)
    }
}
