//! Opt-in retry decorator
//!
//! [`RetryingFetcher`] wraps any [`ArchiveFetcher`] and repeats a fetch only
//! when the server never answered (timeout or transport failure). A status
//! response or an empty body is an answer and is returned as-is. Backoff
//! sleeps end early when shutdown is requested.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use super::retry_formatter::{RetryContext, RetryErrorType};
use super::{ArchiveFetcher, FetchAttempt};
use crate::downloader::config::RetryPolicy;
use crate::metrics::record_retry_backoff;
use crate::shutdown::SharedShutdown;

/// Retries transport misses with exponential backoff
#[derive(Debug)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
    shutdown: Option<SharedShutdown>,
}

impl<F: ArchiveFetcher> RetryingFetcher<F> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            shutdown: None,
        }
    }

    /// Stop sleeping between retries once `shutdown` fires
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wrapped fetcher
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Sleep for `duration`; false if shutdown interrupted the wait.
    async fn backoff(&self, duration: std::time::Duration) -> bool {
        match &self.shutdown {
            Some(shutdown) => {
                if shutdown.is_shutdown_requested() {
                    return false;
                }
                tokio::select! {
                    _ = tokio::time::sleep(duration) => true,
                    _ = shutdown.wait_for_shutdown() => false,
                }
            }
            None => {
                tokio::time::sleep(duration).await;
                true
            }
        }
    }
}

#[async_trait]
impl<F: ArchiveFetcher> ArchiveFetcher for RetryingFetcher<F> {
    async fn fetch(&self, date: NaiveDate) -> FetchAttempt {
        let max_attempts = self.policy.max_attempts();
        let mut retry: u32 = 0;

        loop {
            let attempt = self.inner.fetch(date).await;

            let (miss, error_type) = match &attempt {
                FetchAttempt::Miss(miss) => match RetryErrorType::from_miss(miss) {
                    Some(error_type) => (miss.clone(), error_type),
                    None => return attempt,
                },
                FetchAttempt::Payload(_) => {
                    if retry > 0 {
                        info!(
                            %date,
                            "Retry attempt {}/{} succeeded - resuming download",
                            retry + 1,
                            max_attempts
                        );
                    }
                    return attempt;
                }
            };

            if retry >= self.policy.max_retries {
                if retry > 0 {
                    let ctx = RetryContext::new(
                        retry + 1,
                        max_attempts,
                        error_type,
                        &miss,
                        std::time::Duration::ZERO,
                        date,
                        self.inner.locator(date),
                    );
                    warn!(%date, "{}", ctx.format_failure());
                }
                return attempt;
            }

            let backoff = self.policy.backoff(retry);
            let ctx = RetryContext::new(
                retry + 1,
                max_attempts,
                error_type,
                &miss,
                backoff,
                date,
                self.inner.locator(date),
            );
            warn!(%date, attempt = retry + 1, error = %miss, "{}", ctx.format_retry());
            record_retry_backoff(backoff, retry + 1);

            if !self.backoff(backoff).await {
                info!(%date, "Shutdown requested, abandoning retries");
                return attempt;
            }
            retry += 1;
        }
    }

    fn locator(&self, date: NaiveDate) -> String {
        self.inner.locator(date)
    }
}
