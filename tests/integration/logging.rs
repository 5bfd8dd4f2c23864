//! Integration tests for logging and tracing

use bhavcopy_downloader::fetcher::{FetchAttempt, Miss};
use bhavcopy_downloader::report::LogReporter;
use bhavcopy_downloader::{DateSpan, RangeOrchestrator};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use crate::support::{date, ist, nse_calendar, StubFetcher};

/// In-memory log sink
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run a weekend-plus-Monday span under `filter`, returning what was logged
async fn logs_for_weekend_run(filter: &str, json: bool) -> String {
    let capture = Capture::default();
    let writer = {
        let capture = capture.clone();
        move || capture.clone()
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_ansi(false);
    let _guard = if json {
        tracing::subscriber::set_default(builder.json().with_writer(writer).finish())
    } else {
        tracing::subscriber::set_default(builder.with_writer(writer).finish())
    };

    let orchestrator = RangeOrchestrator::new(nse_calendar(), StubFetcher::succeeding())
        .with_clock(ist(2025, 1, 8, 12, 0));
    let span = DateSpan::new(date(2025, 1, 4), date(2025, 1, 6)).unwrap();
    orchestrator.run(span, &mut LogReporter).await.unwrap();

    capture.contents()
}

/// The binary's default filter keeps per-day skip chatter out of the log
#[tokio::test]
async fn test_default_filter_hides_debug_lines() {
    let logs = logs_for_weekend_run("bhavcopy_downloader=info", false).await;
    assert!(logs.contains("Starting range run"), "{logs}");
    assert!(!logs.contains("Skipping non-trading day"), "{logs}");
    assert!(!logs.contains("DEBUG"), "{logs}");

    let verbose = logs_for_weekend_run("bhavcopy_downloader=debug", false).await;
    assert!(verbose.contains("Skipping non-trading day"), "{verbose}");
}

/// `LOG_FORMAT=json` output is one JSON object per line
#[tokio::test]
async fn test_json_format_lines_parse() {
    let logs = logs_for_weekend_run("bhavcopy_downloader=info", true).await;
    let events: Vec<serde_json::Value> = logs
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(!events.is_empty());
    assert!(events.iter().all(|event| event["level"].is_string()));
    assert!(events.iter().any(|event| event["fields"]["message"]
        .as_str()
        .is_some_and(|message| message.contains("Starting range run"))));
}

/// A run logs its start, one progress line per date and a closing line
#[tokio::test]
async fn test_run_emits_progress_lines() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("bhavcopy_downloader=info"))
        .with_ansi(false)
        .with_writer({
            let capture = capture.clone();
            move || capture.clone()
        })
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let fetcher = StubFetcher::succeeding()
        .with(date(2025, 2, 27), FetchAttempt::Miss(Miss::Status(404)));
    let orchestrator =
        RangeOrchestrator::new(nse_calendar(), fetcher).with_clock(ist(2025, 3, 1, 12, 0));
    let span = DateSpan::new(date(2025, 2, 25), date(2025, 2, 27)).unwrap();
    orchestrator.run(span, &mut LogReporter).await.unwrap();

    let logs = capture.contents();
    assert!(logs.contains("Starting range run"), "{logs}");
    assert!(logs.contains("[PROGRESS] 1/3"), "{logs}");
    assert!(logs.contains("skipped (holiday: Mahashivratri)"), "{logs}");
    assert!(logs.contains("[PROGRESS] 3/3"), "{logs}");
    assert!(logs.contains("No archive for trading day"), "{logs}");
    assert!(logs.contains("[DONE] 3 dates: 1 fetched, 1 skipped, 1 unavailable"), "{logs}");
}

/// Years missing from the holiday table are called out
#[tokio::test]
async fn test_uncovered_year_is_warned() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("bhavcopy_downloader=warn"))
        .with_ansi(false)
        .with_writer({
            let capture = capture.clone();
            move || capture.clone()
        })
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let orchestrator = RangeOrchestrator::new(nse_calendar(), StubFetcher::succeeding())
        .with_clock(ist(2024, 12, 31, 20, 0));
    let span = DateSpan::single(date(2024, 12, 30));
    orchestrator.run(span, &mut LogReporter).await.unwrap();

    let logs = capture.contents();
    assert!(logs.contains("Holiday table does not cover this year"), "{logs}");
    assert!(logs.contains("year=2024"), "{logs}");
}
