//! Prometheus metrics for range runs
//!
//! Recording is always cheap: without an installed exporter the `metrics`
//! macros are no-ops, so library users and tests pay nothing. The binary
//! installs the exporter when `--metrics-addr` is given.
//!
//! ## Metrics
//!
//! - `bhavcopy_fetch_total{status}` - fetch attempts by raw result
//! - `bhavcopy_fetch_duration_seconds` - per-request latency
//! - `bhavcopy_fetch_bytes_total` - payload bytes received
//! - `bhavcopy_retries_total{attempt}` / `bhavcopy_retry_backoff_seconds`
//! - `bhavcopy_outcomes_total{status}` - settled per-date outcomes
//! - `bhavcopy_runs_total{result}` and `bhavcopy_run_dates` gauges

use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::downloader::RunSummary;
use crate::fetcher::Miss;

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent; a second call is a no-op.
///
/// # Arguments
/// * `addr` - Socket address for the scrape endpoint (e.g., "127.0.0.1:9090")
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "bhavcopy_fetch_total",
        Unit::Count,
        "Archive fetch attempts by result"
    );
    describe_histogram!(
        "bhavcopy_fetch_duration_seconds",
        Unit::Seconds,
        "Archive request duration in seconds"
    );
    describe_counter!(
        "bhavcopy_fetch_bytes_total",
        Unit::Bytes,
        "Archive payload bytes received"
    );
    describe_counter!(
        "bhavcopy_retries_total",
        Unit::Count,
        "Retry attempts after transport failures"
    );
    describe_histogram!(
        "bhavcopy_retry_backoff_seconds",
        Unit::Seconds,
        "Backoff before each retry in seconds"
    );
    describe_counter!(
        "bhavcopy_outcomes_total",
        Unit::Count,
        "Settled per-date outcomes by status"
    );
    describe_counter!(
        "bhavcopy_runs_total",
        Unit::Count,
        "Completed range runs by result"
    );
    describe_gauge!(
        "bhavcopy_run_dates",
        Unit::Count,
        "Per-status date counts of the most recent run"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Timing and result recording for one archive request
pub struct FetchMetrics {
    date: NaiveDate,
    start_time: Instant,
}

impl FetchMetrics {
    /// Start timing a request for `date`
    pub fn start(date: NaiveDate) -> Self {
        Self {
            date,
            start_time: Instant::now(),
        }
    }

    /// Record a successful download of `bytes` bytes
    pub fn record_payload(&self, bytes: usize) {
        let duration = self.record_attempt("payload");
        counter!("bhavcopy_fetch_bytes_total").increment(bytes as u64);
        debug!(
            date = %self.date,
            bytes,
            duration_ms = duration.as_millis(),
            "Fetch recorded"
        );
    }

    /// Record a request that produced no usable payload
    pub fn record_miss(&self, miss: &Miss) {
        let duration = self.record_attempt(miss.label());
        debug!(
            date = %self.date,
            miss = %miss,
            duration_ms = duration.as_millis(),
            "Fetch miss recorded"
        );
    }

    fn record_attempt(&self, status: &'static str) -> Duration {
        let duration = self.start_time.elapsed();
        counter!("bhavcopy_fetch_total", "status" => status).increment(1);
        histogram!("bhavcopy_fetch_duration_seconds").record(duration.as_secs_f64());
        duration
    }
}

/// Record retry backoff duration
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(
        "bhavcopy_retries_total",
        "attempt" => attempt.to_string(),
    )
    .increment(1);

    histogram!("bhavcopy_retry_backoff_seconds").record(duration.as_secs_f64());

    debug!(
        attempt = attempt,
        backoff_ms = duration.as_millis(),
        "Retry backoff recorded"
    );
}

/// Record one settled per-date outcome
pub fn record_outcome(status: &'static str) {
    counter!("bhavcopy_outcomes_total", "status" => status).increment(1);
}

/// Record the totals of a finished run
pub fn record_run(summary: &RunSummary, result: &'static str) {
    counter!("bhavcopy_runs_total", "result" => result).increment(1);

    gauge!("bhavcopy_run_dates", "status" => "total").set(summary.total_days as f64);
    gauge!("bhavcopy_run_dates", "status" => "fetched").set(summary.fetched_count as f64);
    gauge!("bhavcopy_run_dates", "status" => "skipped").set(summary.skipped_count as f64);
    gauge!("bhavcopy_run_dates", "status" => "unavailable")
        .set(summary.unavailable_count as f64);
}

/// Check if metrics system is initialized
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}
