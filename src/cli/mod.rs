//! CLI command implementations

pub mod calendar;
pub mod download;
pub mod error;
pub mod progress;
pub mod validate;

pub use calendar::CalendarArgs;
pub use download::{Cli, Commands, DownloadArgs, OutputFormat};
pub use error::CliError;
pub use progress::ProgressBarReporter;
pub use validate::ValidateCommand;
