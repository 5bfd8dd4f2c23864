//! HTTP archive fetcher
//!
//! One GET per trading date against the publisher's URL template, with the
//! configured static headers and a bounded per-request timeout. There is no
//! retry here; wrap the fetcher in [`super::RetryingFetcher`] for that.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, warn};

use super::publisher_config::PublisherConfig;
use super::{ArchiveFetcher, FetchAttempt, FetcherError, FetcherResult, Miss};
use crate::metrics::FetchMetrics;

/// Fetches daily archives over HTTP
#[derive(Debug, Clone)]
pub struct HttpArchiveFetcher {
    client: Client,
    config: PublisherConfig,
}

impl HttpArchiveFetcher {
    /// Build a fetcher and its HTTP client from a publisher configuration
    pub fn new(config: PublisherConfig) -> FetcherResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .default_headers(build_headers(&config)?)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetcherError::ClientBuild(e.to_string()))?;

        debug!(
            publisher = %config.name,
            template = %config.url_template,
            timeout_secs = config.timeout_secs,
            "Created HTTP archive fetcher"
        );

        Ok(Self { client, config })
    }

    /// NSE equity bhavcopy fetcher with default settings
    pub fn nse() -> FetcherResult<Self> {
        Self::new(PublisherConfig::nse_equity())
    }

    /// Publisher configuration in use
    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Locator for the archive of `date`
    pub fn archive_url(&self, date: NaiveDate) -> String {
        self.config.archive_url(date)
    }
}

fn build_headers(config: &PublisherConfig) -> FetcherResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetcherError::InvalidHeader(format!("{name}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| FetcherError::InvalidHeader(format!("{name}: {e}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Map a reqwest failure onto a transport miss
fn transport_miss(err: &reqwest::Error) -> Miss {
    if err.is_timeout() {
        Miss::Timeout(err.to_string())
    } else {
        Miss::Transport(err.to_string())
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch(&self, date: NaiveDate) -> FetchAttempt {
        let url = self.archive_url(date);
        let metrics = FetchMetrics::start(date);
        debug!(%date, %url, "Requesting archive");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                let miss = transport_miss(&e);
                warn!(%date, %url, error = %e, "Archive request failed");
                metrics.record_miss(&miss);
                return FetchAttempt::Miss(miss);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let miss = Miss::Status(status.as_u16());
            debug!(%date, status = status.as_u16(), "Archive not served");
            metrics.record_miss(&miss);
            return FetchAttempt::Miss(miss);
        }

        match response.bytes().await {
            Ok(body) if body.is_empty() => {
                debug!(%date, "Archive response had an empty body");
                metrics.record_miss(&Miss::EmptyBody);
                FetchAttempt::Miss(Miss::EmptyBody)
            }
            Ok(body) => {
                debug!(%date, bytes = body.len(), "Downloaded archive");
                metrics.record_payload(body.len());
                FetchAttempt::Payload(body)
            }
            Err(e) => {
                let miss = transport_miss(&e);
                warn!(%date, error = %e, "Failed to read archive body");
                metrics.record_miss(&miss);
                FetchAttempt::Miss(miss)
            }
        }
    }

    fn locator(&self, date: NaiveDate) -> String {
        self.archive_url(date)
    }
}
