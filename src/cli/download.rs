//! Download command implementation

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use super::calendar::CalendarArgs;
use super::progress::ProgressBarReporter;
use super::{CliError, ValidateCommand};
use crate::config::AppConfig;
use crate::downloader::config::MAX_CONCURRENCY;
use crate::downloader::{FetchOutcome, FetchStatus, RangeOrchestrator, RunReport};
use crate::fetcher::{HttpArchiveFetcher, RetryingFetcher};
use crate::output::bundle_file_name;
use crate::shutdown::SharedShutdown;
use crate::span::DateSpan;

/// Parse and validate concurrency value
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Parse a `YYYY-MM-DD` argument, defaulting to `today` when absent
pub fn parse_date_arg(
    input: Option<&str>,
    today: NaiveDate,
    name: &str,
) -> Result<NaiveDate, CliError> {
    match input {
        None => Ok(today),
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
            CliError::InvalidArgument(format!(
                "invalid {name} date '{value}': {e} (expected YYYY-MM-DD)"
            ))
        }),
    }
}

/// Bhavcopy downloader CLI
#[derive(Parser, Debug)]
#[command(name = "bhavcopy")]
#[command(about = "Download NSE bhavcopy archives for a date range into one ZIP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Number of concurrent fetches (default from config: 1, max: 16)
    ///
    /// The publisher throttles aggressive clients; values above 4 rarely help.
    #[arg(long, global = true, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Retries after timeouts and connection failures (default from config: 0)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: Option<u32>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Holiday table file (TOML), overriding the configured one
    #[arg(long, global = true)]
    pub holidays: Option<PathBuf>,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Configuration file contents, or the built-in defaults
    pub fn load_config(&self) -> Result<AppConfig, CliError> {
        match &self.config {
            Some(path) => Ok(AppConfig::load(path)?),
            None => Ok(AppConfig::default()),
        }
    }
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download archives for a date range into one ZIP
    Download(DownloadArgs),

    /// Show how each date of a range is classified
    Calendar(CalendarArgs),

    /// Validate holiday tables or configuration files
    Validate(ValidateCommand),
}

/// Download command arguments
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// First date (YYYY-MM-DD), defaults to today at the publisher
    #[arg(long)]
    pub start: Option<String>,

    /// Last date (YYYY-MM-DD), defaults to today at the publisher
    #[arg(long)]
    pub end: Option<String>,

    /// Output file, defaults to BhavCopy_Pro_<start>_to_<end>.zip
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Stop the run after this many seconds
    #[arg(long)]
    pub run_timeout: Option<u64>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

impl DownloadArgs {
    /// Execute the download command
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = cli.load_config()?;
        let calendar = config.build_calendar(cli.holidays.as_deref())?;

        let today = calendar.today(Utc::now());
        let start = parse_date_arg(self.start.as_deref(), today, "start")?;
        let end = parse_date_arg(self.end.as_deref(), today, "end")?;
        let span = DateSpan::new(start, end)?;

        let mut run = config.run.clone();
        if let Some(concurrency) = cli.concurrency {
            run.concurrency = concurrency;
        }
        if let Some(max_retries) = cli.max_retries {
            run.max_retries = max_retries;
        }
        if let Some(secs) = self.run_timeout {
            run.run_timeout_secs = Some(secs);
        }

        let http = HttpArchiveFetcher::new(config.publisher.clone())?;
        let orchestrator = if run.max_retries > 0 {
            let fetcher = RetryingFetcher::new(http, run.retry_policy())
                .with_shutdown(shutdown.clone());
            RangeOrchestrator::new(calendar, fetcher)
        } else {
            RangeOrchestrator::new(calendar, http)
        }
        .with_config(run.orchestrator())
        .with_shutdown(shutdown);

        let show_progress = cli.output_format == OutputFormat::Human && !self.no_progress;
        let mut reporter = ProgressBarReporter::new(span.day_count() as u64, show_progress);
        let report = orchestrator.run(span, &mut reporter).await?;

        let output_path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(bundle_file_name(&span)));

        let written = if report.archive.is_empty() {
            warn!(%span, "Nothing to download; no archive written");
            None
        } else {
            report.archive.write_to(&output_path)?;
            info!(path = %output_path.display(), entries = report.archive.len(), "Archive saved");
            Some(output_path.as_path())
        };

        match cli.output_format {
            OutputFormat::Json => output_json(&span, &report, written),
            OutputFormat::Human => output_human(&span, &report, written),
        }
        Ok(())
    }
}

/// Status detail shown next to the label
fn status_detail(status: &FetchStatus) -> Option<String> {
    match status {
        FetchStatus::Fetched(bytes) => Some(format!("{} bytes", bytes.len())),
        FetchStatus::NotYetPublished { expected_at } => Some(expected_at.to_rfc3339()),
        FetchStatus::Unavailable(reason) => Some(reason.to_string()),
        FetchStatus::SkippedHoliday(name) => Some(name.clone()),
        FetchStatus::TransientError(detail) => Some(detail.clone()),
        FetchStatus::SkippedWeekend => None,
    }
}

fn outcome_json(outcome: &FetchOutcome) -> serde_json::Value {
    serde_json::json!({
        "date": outcome.date,
        "status": outcome.status.label(),
        "detail": status_detail(&outcome.status),
    })
}

fn output_json(span: &DateSpan, report: &RunReport, written: Option<&Path>) {
    let output = serde_json::json!({
        "success": report.is_complete(),
        "start": span.start(),
        "end": span.end(),
        "output": written.map(|p| p.display().to_string()),
        "entries": report.archive.entries(),
        "interruption": report.interruption,
        "summary": report.summary,
        "outcomes": report.outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Failed to serialize report"),
    }
}

fn output_human(span: &DateSpan, report: &RunReport, written: Option<&Path>) {
    match report.interruption {
        None => println!("\nDownload completed: {span}"),
        Some(reason) => println!("\nDownload stopped early ({reason}): {span}"),
    }

    for outcome in &report.outcomes {
        match status_detail(&outcome.status) {
            Some(detail) => println!(
                "  {}  {:<18} {}",
                outcome.date,
                outcome.status.label(),
                detail
            ),
            None => println!("  {}  {}", outcome.date, outcome.status.label()),
        }
    }

    let summary = &report.summary;
    println!();
    println!("Days: {}", summary.total_days);
    println!("Fetched: {}", summary.fetched_count);
    println!(
        "Skipped: {} (weekends {}, holidays {})",
        summary.skipped_count, summary.weekend_count, summary.holiday_count
    );
    println!(
        "Unavailable: {} (not yet published {}, transient errors {})",
        summary.unavailable_count, summary.not_yet_published_count, summary.transient_error_count
    );
    match written {
        Some(path) => println!("Output: {} ({} files)", path.display(), report.archive.len()),
        None => println!("Output: none (nothing to download)"),
    }
}
