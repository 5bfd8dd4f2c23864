//! Application configuration
//!
//! One TOML file describes the publisher, the publication schedule, the
//! holiday table location and the run knobs. Every key is optional:
//!
//! ```toml
//! holidays = "holidays/nse-2025.toml"
//!
//! [publisher]
//! url_template = "https://nsearchives.nseindia.com/content/cm/BhavCopy_NSE_CM_0_0_0_{date}_F_0000.csv.zip"
//!
//! [schedule]
//! publication_time = "18:30"
//! timezone = "Asia/Kolkata"
//!
//! [run]
//! concurrency = 1
//! max_retries = 0
//! ```
//!
//! A relative `holidays` path is resolved against the directory containing
//! the configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::calendar::{
    CalendarError, HolidayError, HolidayTable, PublicationSchedule, ScheduleConfig,
    TradingCalendar,
};
use crate::downloader::config::{
    OrchestratorConfig, RetryPolicy, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES,
};
use crate::fetcher::{FetcherError, PublisherConfig};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read config {path:?}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Schedule could not be parsed
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Holiday table could not be loaded
    #[error(transparent)]
    Holiday(#[from] HolidayError),

    /// Publisher settings are unusable
    #[error(transparent)]
    Fetcher(#[from] FetcherError),
}

/// Run knobs as written in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Concurrent fetches
    pub concurrency: usize,
    /// Retries after transport failures
    pub max_retries: u32,
    /// Wall-clock limit for a run, in seconds
    pub run_timeout_secs: Option<u64>,
    /// Cap on aggregated payload bytes
    pub max_archive_bytes: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            run_timeout_secs: None,
            max_archive_bytes: None,
        }
    }
}

impl RunConfig {
    /// Orchestrator knobs
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            concurrency: self.concurrency,
            run_timeout: self.run_timeout_secs.map(Duration::from_secs),
            max_archive_bytes: self.max_archive_bytes,
        }
    }

    /// Retry policy for the fetcher
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

/// Whole application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Holiday table file; the bundled table when absent
    pub holidays: Option<PathBuf>,
    /// Remote publisher
    pub publisher: PublisherConfig,
    /// Publication schedule
    pub schedule: ScheduleConfig,
    /// Run knobs
    pub run: RunConfig,
}

impl AppConfig {
    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.publisher.validate()?;
        PublicationSchedule::from_config(&config.schedule)?;
        Ok(config)
    }

    /// Load from a TOML file, resolving a relative `holidays` path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(holidays) = config.holidays.take() {
            let resolved = match path.parent() {
                Some(dir) if holidays.is_relative() => dir.join(holidays),
                _ => holidays,
            };
            config.holidays = Some(resolved);
        }

        debug!(path = %path.display(), holidays = ?config.holidays, "Loaded configuration");
        Ok(config)
    }

    /// Holiday table: `override_path`, else the configured file, else the bundled table
    pub fn holiday_table(&self, override_path: Option<&Path>) -> Result<HolidayTable, ConfigError> {
        let table = match override_path.or(self.holidays.as_deref()) {
            Some(path) => HolidayTable::load(path)?,
            None => HolidayTable::bundled()?,
        };
        info!(
            table = table.label(),
            holidays = table.len(),
            "Using holiday table"
        );
        Ok(table)
    }

    /// Trading calendar from the schedule and holiday table
    pub fn build_calendar(
        &self,
        holidays_override: Option<&Path>,
    ) -> Result<TradingCalendar, ConfigError> {
        let schedule = PublicationSchedule::from_config(&self.schedule)?;
        Ok(TradingCalendar::new(
            self.holiday_table(holidays_override)?,
            schedule,
        ))
    }
}
