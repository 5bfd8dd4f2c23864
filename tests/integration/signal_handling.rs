use std::time::Duration;

use bhavcopy_downloader::fetcher::{ArchiveFetcher, FetchAttempt, Miss};
use bhavcopy_downloader::shutdown::ShutdownCoordinator;
use bhavcopy_downloader::{downloader::RetryPolicy, RetryingFetcher};

use crate::support::{date, StubFetcher};

#[tokio::test]
async fn shutdown_notifies_waiters() {
    let shutdown = ShutdownCoordinator::shared();
    let waiter = {
        let handle = shutdown.clone();
        tokio::spawn(async move {
            handle.wait_for_shutdown().await;
            true
        })
    };

    // Give the task time to start waiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.request_shutdown();

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok());
}

/// Shutdown requested before anyone waits must not be missed
#[tokio::test]
async fn shutdown_requested_before_wait_no_deadlock() {
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let handle = shutdown.clone();
    let waiter = tokio::spawn(async move {
        handle.wait_for_shutdown().await;
        true
    });

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok(), "wait_for_shutdown() deadlocked despite shutdown already requested");
}

#[tokio::test]
async fn shutdown_concurrent_waiters_all_notified() {
    let shutdown = ShutdownCoordinator::shared();

    let mut waiters = Vec::new();
    for _ in 0..10 {
        let handle = shutdown.clone();
        waiters.push(tokio::spawn(async move {
            handle.wait_for_shutdown().await;
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.request_shutdown();

    for waiter in waiters {
        let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(result.is_ok(), "A waiter was not notified of shutdown");
    }
}

/// A retry backoff is abandoned as soon as shutdown is requested
#[tokio::test]
async fn shutdown_interrupts_retry_backoff() {
    let shutdown = ShutdownCoordinator::shared();
    let inner = StubFetcher::always(FetchAttempt::Miss(Miss::Transport(
        "connection refused".to_string(),
    )));
    let spy = inner.spy();
    let fetcher = RetryingFetcher::new(
        inner,
        RetryPolicy::new(5).with_initial_backoff(Duration::from_secs(30)),
    )
    .with_shutdown(shutdown.clone());

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.request_shutdown();
        }
    });

    let attempt = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch(date(2025, 1, 6)))
        .await
        .expect("backoff was not interrupted");

    assert!(matches!(attempt, FetchAttempt::Miss(Miss::Transport(_))));
    assert_eq!(spy.call_count(), 1);
}
