//! Run configuration constants and knobs

use std::time::Duration;

/// Default number of in-flight fetches.
/// One request at a time keeps the publisher from throttling us.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Upper bound on in-flight fetches
pub const MAX_CONCURRENCY: usize = 16;

/// Retries are opt-in; a plain run makes exactly one attempt per date.
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 30000; // 30 seconds

fn backoff_from(initial: Duration, max: Duration, retry_count: u32) -> Duration {
    let factor = 2u32.saturating_pow(retry_count.min(31));
    initial.saturating_mul(factor).min(max)
}

/// Retry policy for transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Cap on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    /// Policy with the standard 1s doubling backoff capped at 30s
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }

    /// Override the initial delay
    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        backoff_from(self.initial_backoff, self.max_backoff, retry)
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Orchestrator knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum concurrent fetches (clamped to `1..=MAX_CONCURRENCY`)
    pub concurrency: usize,
    /// Wall-clock limit for the whole run
    pub run_timeout: Option<Duration>,
    /// Cap on payload bytes aggregated into the output archive
    pub max_archive_bytes: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            run_timeout: None,
            max_archive_bytes: None,
        }
    }
}

impl OrchestratorConfig {
    /// Concurrency clamped to the supported range
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }
}
