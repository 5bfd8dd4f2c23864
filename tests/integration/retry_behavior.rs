//! Integration tests for opt-in retries
//!
//! Only failures without a server answer are retried; a status code or an
//! empty body is the publisher's final word for that date.

use bhavcopy_downloader::downloader::RetryPolicy;
use bhavcopy_downloader::fetcher::{ArchiveFetcher, FetchAttempt, Miss, PublisherConfig};
use bhavcopy_downloader::{HttpArchiveFetcher, RetryingFetcher};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::date;

fn fetcher_for(server: &MockServer, max_retries: u32) -> RetryingFetcher<HttpArchiveFetcher> {
    let config = PublisherConfig::nse_equity()
        .with_url_template(format!("{}/{{date}}.zip", server.uri()))
        .with_timeout(Duration::from_secs(1));
    let policy = RetryPolicy::new(max_retries).with_initial_backoff(Duration::from_millis(10));
    RetryingFetcher::new(HttpArchiveFetcher::new(config).unwrap(), policy)
}

#[tokio::test]
async fn test_timeout_then_success_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive".to_vec()))
        .mount(&server)
        .await;

    let attempt = fetcher_for(&server, 2).fetch(date(2025, 1, 6)).await;

    assert!(attempt.is_payload(), "got {attempt:?}");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_miss_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let attempt = fetcher_for(&server, 3).fetch(date(2025, 1, 6)).await;

    assert_eq!(attempt, FetchAttempt::Miss(Miss::Status(404)));
}

#[tokio::test]
async fn test_zero_retries_makes_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let attempt = fetcher_for(&server, 0).fetch(date(2025, 1, 6)).await;

    assert!(matches!(attempt, FetchAttempt::Miss(Miss::Timeout(_))));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[test]
fn test_retry_policy_attempt_budget() {
    assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    assert_eq!(RetryPolicy::new(3).max_attempts(), 4);
    assert_eq!(RetryPolicy::default().max_retries, 0);
}
