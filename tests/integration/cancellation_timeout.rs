//! Early stops keep what was already fetched

use bhavcopy_downloader::report::{ChannelReporter, NoopReporter, ReportEvent};
use bhavcopy_downloader::shutdown::ShutdownCoordinator;
use bhavcopy_downloader::{DateSpan, Interruption, RangeOrchestrator};
use std::time::Duration;

use crate::support::{date, ist, nse_calendar, read_entries, StubFetcher};

fn slow_fetcher() -> StubFetcher {
    StubFetcher::succeeding().with_default_delay(Duration::from_millis(100))
}

fn week() -> DateSpan {
    DateSpan::new(date(2025, 1, 6), date(2025, 1, 10)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_run_returns_partial_archive() {
    let shutdown = ShutdownCoordinator::shared();
    let orchestrator = RangeOrchestrator::new(nse_calendar(), slow_fetcher())
        .with_clock(ist(2025, 1, 10, 20, 0))
        .with_shutdown(shutdown.clone());

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            shutdown.request_shutdown();
        }
    });

    let (mut reporter, mut events) = ChannelReporter::new();
    let report = orchestrator.run(week(), &mut reporter).await.unwrap();

    assert_eq!(report.interruption, Some(Interruption::Cancelled));
    assert!(!report.is_complete());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.summary.total_days, 2);

    let names: Vec<_> = read_entries(&report.archive)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["BhavCopy_20250106.zip", "BhavCopy_20250107.zip"]);

    let mut finished = None;
    while let Ok(event) = events.try_recv() {
        if let ReportEvent::Finished { interruption, .. } = event {
            finished = Some(interruption);
        }
    }
    assert_eq!(finished, Some(Some(Interruption::Cancelled)));
}

#[tokio::test]
async fn test_cancel_before_start_settles_nothing() {
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let fetcher = StubFetcher::succeeding();
    let spy = fetcher.spy();
    let orchestrator = RangeOrchestrator::new(nse_calendar(), fetcher)
        .with_clock(ist(2025, 1, 10, 20, 0))
        .with_shutdown(shutdown);

    let report = orchestrator.run(week(), &mut NoopReporter).await.unwrap();

    assert_eq!(report.interruption, Some(Interruption::Cancelled));
    assert!(report.outcomes.is_empty());
    assert!(report.archive.is_empty());
    assert!(spy.call_count() <= 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_timeout_returns_partial_archive() {
    let orchestrator = RangeOrchestrator::new(nse_calendar(), slow_fetcher())
        .with_clock(ist(2025, 1, 10, 20, 0))
        .with_run_timeout(Duration::from_millis(250));

    let report = orchestrator.run(week(), &mut NoopReporter).await.unwrap();

    assert_eq!(report.interruption, Some(Interruption::TimedOut));
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.archive.len(), 2);
    assert_eq!(report.summary.fetched_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_generous_timeout_completes() {
    let orchestrator = RangeOrchestrator::new(nse_calendar(), slow_fetcher())
        .with_clock(ist(2025, 1, 10, 20, 0))
        .with_run_timeout(Duration::from_secs(60));

    let report = orchestrator.run(week(), &mut NoopReporter).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.archive.len(), 5);
}
