//! Retry message formatting.
//!
//! Keeps the wording of retry, recovery and give-up log lines in one place so
//! every fetcher reports them the same way.

use chrono::NaiveDate;
use std::time::Duration;

use super::Miss;

/// Transport failure kinds worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Request timed out
    NetworkTimeout,
    /// Connection refused or DNS failure
    NetworkOffline,
    /// Any other transport failure
    NetworkGeneric,
}

impl RetryErrorType {
    /// Kind of a transport miss; `None` when the server answered.
    pub fn from_miss(miss: &Miss) -> Option<Self> {
        match miss {
            Miss::Timeout(_) => Some(Self::NetworkTimeout),
            Miss::Transport(detail) => {
                let detail = detail.to_ascii_lowercase();
                if detail.contains("connect") || detail.contains("dns") || detail.contains("resolve")
                {
                    Some(Self::NetworkOffline)
                } else {
                    Some(Self::NetworkGeneric)
                }
            }
            Miss::Status(_) | Miss::EmptyBody => None,
        }
    }

    /// User-friendly description string used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::NetworkGeneric => "network error",
        }
    }

    /// Suggested remediation shown after the last attempt fails.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "Check your network connection or raise the request timeout",
            Self::NetworkOffline => "Verify internet connectivity and DNS resolution",
            Self::NetworkGeneric => "Check network connectivity and try again",
        }
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of error that triggered retry
    pub error_type: RetryErrorType,
    /// Backoff duration until next attempt
    pub backoff_duration: Duration,
    /// Trading date being fetched
    pub date: NaiveDate,
    /// Original error message for details
    pub error_message: String,
    /// URL that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Context for a transport miss of kind `error_type` on `date`.
    pub fn new(
        attempt: u32,
        max_attempts: u32,
        error_type: RetryErrorType,
        miss: &Miss,
        backoff_duration: Duration,
        date: NaiveDate,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            error_type,
            backoff_duration,
            date,
            error_message: miss.to_string(),
            endpoint: endpoint.into(),
        }
    }

    /// Format standardized retry message with attempt counters and context.
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds... ({})",
            self.attempt + 1,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64(),
            self.date
        )
    }

    /// Format final failure summary with actionable suggestions.
    pub fn format_failure(&self) -> String {
        let lines = [
            format!("[FAILED] Fetch failed after {} attempts", self.attempt),
            format!("  Last error: {}", self.error_message),
            format!("  Date: {}", self.date),
            format!("  Endpoint: {}", self.endpoint),
            "  Suggestions:".to_string(),
        ];

        let mut message = lines.join("\n");
        for suggestion in self.format_suggestions() {
            message.push_str(&format!("\n    - {suggestion}"));
        }
        message
    }

    /// Derive suggestions tailored to the current retry context.
    pub fn format_suggestions(&self) -> Vec<String> {
        vec![
            self.error_type.suggestion().to_string(),
            format!(
                "Try increasing --max-retries (current: {})",
                self.max_attempts.saturating_sub(1)
            ),
        ]
    }
}
