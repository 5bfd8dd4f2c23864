//! Terminal progress bar for range runs

use indicatif::{ProgressBar, ProgressStyle};

use crate::downloader::{FetchOutcome, Interruption, RunSummary};
use crate::report::{OutcomeReporter, Progress};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Drives an indicatif bar from run outcomes
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    /// Bar for `total` days; hidden when `visible` is false
    pub fn new(total: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

impl OutcomeReporter for ProgressBarReporter {
    fn on_outcome(&mut self, progress: Progress, outcome: &FetchOutcome) {
        self.bar.set_position(progress.index as u64);
        self.bar
            .set_message(format!("{} {}", outcome.date, outcome.status.label()));
    }

    fn on_finish(&mut self, summary: &RunSummary, interruption: Option<Interruption>) {
        match interruption {
            Some(reason) => self.bar.abandon_with_message(format!("{reason}: {summary}")),
            None => self.bar.finish_and_clear(),
        }
    }
}
