//! CLI error types and conversions

use crate::calendar::HolidayError;
use crate::config::ConfigError;
use crate::downloader::RunError;
use crate::fetcher::FetcherError;
use crate::output::OutputError;
use crate::span::SpanError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Holiday table error
    #[error("holiday table error: {0}")]
    Holiday(#[from] HolidayError),

    /// Date span error
    #[error("invalid date span: {0}")]
    Span(#[from] SpanError),

    /// Run error
    #[error("download error: {0}")]
    Run(#[from] RunError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
