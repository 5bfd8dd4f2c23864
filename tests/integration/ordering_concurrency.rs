//! Bounded concurrency with date-ordered outcomes

use bhavcopy_downloader::report::{ChannelReporter, NoopReporter, ReportEvent};
use bhavcopy_downloader::{DateSpan, RangeOrchestrator};
use std::time::Duration;

use crate::support::{date, ist, nse_calendar, read_entries, StubFetcher};

/// Earlier dates answer slowest, so completion order is reversed
fn reversed_latency() -> StubFetcher {
    StubFetcher::succeeding()
        .with_delay(date(2025, 1, 6), Duration::from_millis(50))
        .with_delay(date(2025, 1, 7), Duration::from_millis(40))
        .with_delay(date(2025, 1, 8), Duration::from_millis(30))
        .with_delay(date(2025, 1, 9), Duration::from_millis(20))
        .with_delay(date(2025, 1, 10), Duration::from_millis(10))
}

fn week() -> DateSpan {
    DateSpan::new(date(2025, 1, 6), date(2025, 1, 10)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_outcomes_in_date_order_under_concurrency() {
    let fetcher = reversed_latency();
    let spy = fetcher.spy();
    let orchestrator = RangeOrchestrator::new(nse_calendar(), fetcher)
        .with_clock(ist(2025, 1, 10, 20, 0))
        .with_concurrency(5);

    let (mut reporter, mut events) = ChannelReporter::new();
    let report = orchestrator.run(week(), &mut reporter).await.unwrap();

    let dates: Vec<_> = report.outcomes.iter().map(|o| o.date).collect();
    let expected: Vec<_> = week().days().collect();
    assert_eq!(dates, expected);
    assert!(spy.peak_in_flight() > 1);
    assert!(spy.peak_in_flight() <= 5);

    let mut indices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ReportEvent::Outcome { progress, outcome } = event {
            assert_eq!(progress.total, 5);
            assert_eq!(outcome.date, expected[progress.index - 1]);
            indices.push(progress.index);
        }
    }
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_by_default() {
    let fetcher = reversed_latency();
    let spy = fetcher.spy();
    let orchestrator =
        RangeOrchestrator::new(nse_calendar(), fetcher).with_clock(ist(2025, 1, 10, 20, 0));

    orchestrator.run(week(), &mut NoopReporter).await.unwrap();

    assert_eq!(spy.peak_in_flight(), 1);
    assert_eq!(spy.calls(), week().days().collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_capped() {
    let fetcher = StubFetcher::succeeding().with_default_delay(Duration::from_millis(10));
    let spy = fetcher.spy();
    let orchestrator = RangeOrchestrator::new(nse_calendar(), fetcher)
        .with_clock(ist(2025, 3, 1, 12, 0))
        .with_concurrency(2);

    let span = DateSpan::new(date(2025, 2, 3), date(2025, 2, 14)).unwrap();
    orchestrator.run(span, &mut NoopReporter).await.unwrap();

    assert_eq!(spy.peak_in_flight(), 2);
    assert_eq!(spy.call_count(), 10);
}

/// Entry order is date order no matter which fetch finished first
#[tokio::test(start_paused = true)]
async fn test_concurrent_archive_matches_sequential() {
    let sequential = RangeOrchestrator::new(nse_calendar(), reversed_latency())
        .with_clock(ist(2025, 1, 10, 20, 0))
        .run(week(), &mut NoopReporter)
        .await
        .unwrap();
    let concurrent = RangeOrchestrator::new(nse_calendar(), reversed_latency())
        .with_clock(ist(2025, 1, 10, 20, 0))
        .with_concurrency(4)
        .run(week(), &mut NoopReporter)
        .await
        .unwrap();

    assert_eq!(read_entries(&sequential.archive), read_entries(&concurrent.archive));
    assert_eq!(sequential.archive.bytes(), concurrent.archive.bytes());
}
