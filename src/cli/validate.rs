//! Validation subcommand

use clap::Parser;
use std::path::{Path, PathBuf};

use super::CliError;
use crate::calendar::HolidayTable;
use crate::config::AppConfig;

/// Validate command for checking reference data files
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// What to validate
    #[command(subcommand)]
    pub target: ValidateTarget,
}

/// Target type for validation
#[derive(clap::Subcommand, Debug)]
pub enum ValidateTarget {
    /// Validate a holiday table
    Holidays {
        /// Holiday table file (TOML)
        path: PathBuf,
    },
    /// Validate a configuration file
    Config {
        /// Configuration file (TOML)
        path: PathBuf,
    },
}

impl ValidateCommand {
    /// Execute the validation command
    pub async fn execute(&self) -> Result<(), CliError> {
        match &self.target {
            ValidateTarget::Holidays { path } => self.validate_holidays(path),
            ValidateTarget::Config { path } => self.validate_config(path),
        }
    }

    fn validate_holidays(&self, path: &Path) -> Result<(), CliError> {
        let table = match HolidayTable::load(path) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Invalid holiday table: {e}");
                return Err(e.into());
            }
        };

        println!("Valid holiday table: {}", table.label());
        println!("  Years: {:?}", table.years().collect::<Vec<_>>());
        println!("  Holidays: {}", table.len());
        for date in table.weekend_entries() {
            println!("  Warning: {date} falls on a weekend and will be treated as a weekend");
        }
        Ok(())
    }

    fn validate_config(&self, path: &Path) -> Result<(), CliError> {
        let config = match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Invalid configuration: {e}");
                return Err(e.into());
            }
        };
        let calendar = config.build_calendar(None)?;

        println!("Valid configuration: {}", path.display());
        println!("  Publisher: {}", config.publisher.name);
        println!("  URL template: {}", config.publisher.url_template);
        println!(
            "  Publication: {} {}",
            calendar.schedule().time_of_day().format("%H:%M"),
            calendar.schedule().timezone()
        );
        println!(
            "  Holiday table: {} ({} holidays)",
            calendar.holidays().label(),
            calendar.holidays().len()
        );
        println!(
            "  Concurrency: {}, retries: {}",
            config.run.concurrency, config.run.max_retries
        );
        Ok(())
    }
}
