//! Archive fetchers
//!
//! An [`ArchiveFetcher`] retrieves the archive for one trading date and
//! reports the raw result as a [`FetchAttempt`]: either the payload, or a
//! typed [`Miss`] saying *why* nothing usable came back. Deciding what a miss
//! means (not yet published, absent, transient) needs the calendar and the
//! current instant, so that happens in the orchestrator, not here.
//!
//! - [`http::HttpArchiveFetcher`] - single GET per date with a bounded timeout
//! - [`retry::RetryingFetcher`] - opt-in decorator retrying transport failures

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use std::sync::Arc;

pub mod http;
pub mod publisher_config;
pub mod retry;
pub mod retry_formatter;

pub use http::HttpArchiveFetcher;
pub use publisher_config::PublisherConfig;
pub use retry::RetryingFetcher;

/// Fetcher construction errors.
///
/// Per-date network failures are never errors; they are [`Miss`] values.
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Configured header name or value is not valid HTTP
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// URL template or date format is unusable
    #[error("invalid URL template: {0}")]
    InvalidTemplate(String),
}

/// Result type for fetcher construction
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Why a fetch attempt produced no usable payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    /// Server answered with a non-success status
    Status(u16),
    /// Server answered with success but an empty body
    EmptyBody,
    /// Request exceeded its timeout
    Timeout(String),
    /// Connection, DNS, TLS or body-read failure
    Transport(String),
}

impl Miss {
    /// Short label for metrics and logs
    pub fn label(&self) -> &'static str {
        match self {
            Miss::Status(_) => "http_status",
            Miss::EmptyBody => "empty_body",
            Miss::Timeout(_) => "timeout",
            Miss::Transport(_) => "transport",
        }
    }
}

impl std::fmt::Display for Miss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Miss::Status(code) => write!(f, "HTTP {code}"),
            Miss::EmptyBody => write!(f, "empty response body"),
            Miss::Timeout(detail) => write!(f, "timeout: {detail}"),
            Miss::Transport(detail) => write!(f, "network error: {detail}"),
        }
    }
}

/// Raw result of one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttempt {
    /// Archive bytes (never empty)
    Payload(Bytes),
    /// No usable payload
    Miss(Miss),
}

impl FetchAttempt {
    /// Whether the attempt produced a payload
    pub fn is_payload(&self) -> bool {
        matches!(self, FetchAttempt::Payload(_))
    }
}

/// Retrieves the archive for one trading date
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Fetch the archive for `date`.
    ///
    /// Must not panic or return early on network failures; every failure is
    /// reported as [`FetchAttempt::Miss`].
    async fn fetch(&self, date: NaiveDate) -> FetchAttempt;

    /// Resource locator for `date`, used in logs
    fn locator(&self, date: NaiveDate) -> String;
}

#[async_trait]
impl<F: ArchiveFetcher + ?Sized> ArchiveFetcher for Arc<F> {
    async fn fetch(&self, date: NaiveDate) -> FetchAttempt {
        (**self).fetch(date).await
    }

    fn locator(&self, date: NaiveDate) -> String {
        (**self).locator(date)
    }
}

#[async_trait]
impl<F: ArchiveFetcher + ?Sized> ArchiveFetcher for Box<F> {
    async fn fetch(&self, date: NaiveDate) -> FetchAttempt {
        (**self).fetch(date).await
    }

    fn locator(&self, date: NaiveDate) -> String {
        (**self).locator(date)
    }
}
