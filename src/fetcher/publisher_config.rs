//! Publisher configuration
//!
//! Everything that identifies *where* daily archives live is data, not code:
//! the URL template, the date token format, the static request headers and
//! the request timeouts. The default is the NSE equity cash-market bhavcopy.
//!
//! # URL template
//!
//! The template must contain the `{date}` token, which is replaced by the
//! trading date formatted with `date_format` (chrono strftime syntax):
//!
//! ```text
//! https://nsearchives.nseindia.com/content/cm/BhavCopy_NSE_CM_0_0_0_{date}_F_0000.csv.zip
//! ```

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

use super::{FetcherError, FetcherResult};

/// Placeholder replaced by the formatted trading date
pub const DATE_TOKEN: &str = "{date}";

/// NSE equity cash-market bhavcopy location
pub const NSE_CM_URL_TEMPLATE: &str =
    "https://nsearchives.nseindia.com/content/cm/BhavCopy_NSE_CM_0_0_0_{date}_F_0000.csv.zip";

/// Browser-like agent string; the NSE archive host rejects unidentified clients
pub const NSE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Referrer expected by the NSE archive host
pub const NSE_REFERER: &str = "https://www.nseindia.com/";

/// Per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// TCP connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Remote publisher description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Display name used in logs
    pub name: String,

    /// Resource locator template containing [`DATE_TOKEN`]
    pub url_template: String,

    /// strftime format for the date token (e.g. `%Y%m%d`)
    pub date_format: String,

    /// Static request headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Overall per-request timeout in seconds
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self::nse_equity()
    }
}

impl PublisherConfig {
    /// NSE equity segment bhavcopy archive
    pub fn nse_equity() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), NSE_USER_AGENT.to_string());
        headers.insert("Referer".to_string(), NSE_REFERER.to_string());

        Self {
            name: "NSE equity bhavcopy".to_string(),
            url_template: NSE_CM_URL_TEMPLATE.to_string(),
            date_format: "%Y%m%d".to_string(),
            headers,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Same publisher settings pointed at a different template (for testing)
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Check the template and format before any request is built
    pub fn validate(&self) -> FetcherResult<()> {
        if !self.url_template.contains(DATE_TOKEN) {
            return Err(FetcherError::InvalidTemplate(format!(
                "'{}' does not contain the {} token",
                self.url_template, DATE_TOKEN
            )));
        }
        if self.date_format.trim().is_empty() {
            return Err(FetcherError::InvalidTemplate(
                "date_format cannot be empty".to_string(),
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(FetcherError::InvalidTemplate(format!(
                "invalid date_format '{}'",
                self.date_format
            )));
        }
        // Time and offset fields parse fine but cannot be rendered from a date
        let sample = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|date| format_date(date, &self.date_format));
        if sample.is_none() {
            return Err(FetcherError::InvalidTemplate(format!(
                "date_format '{}' needs fields a calendar date does not have",
                self.date_format
            )));
        }
        if self.timeout_secs == 0 {
            return Err(FetcherError::InvalidTemplate(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(FetcherError::InvalidTemplate(
                "connect_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Locator for the archive of `date`.
    ///
    /// A format that [`validate`](Self::validate) would reject falls back to
    /// `%Y%m%d` instead of panicking.
    pub fn archive_url(&self, date: NaiveDate) -> String {
        let token = format_date(date, &self.date_format)
            .unwrap_or_else(|| date.format("%Y%m%d").to_string());
        self.url_template.replace(DATE_TOKEN, &token)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Render `date` with `format`, `None` when the format asks for time fields
fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut token = String::new();
    write!(token, "{}", date.format(format)).ok()?;
    Some(token)
}
