//! Calendar subcommand: show how each date of a range is classified

use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;

use super::download::{parse_date_arg, OutputFormat};
use super::{Cli, CliError};
use crate::calendar::{DayClass, TradingCalendar};
use crate::span::DateSpan;

/// Calendar command arguments
#[derive(Parser, Debug)]
pub struct CalendarArgs {
    /// First date (YYYY-MM-DD), defaults to today at the publisher
    #[arg(long)]
    pub start: Option<String>,

    /// Last date (YYYY-MM-DD), defaults to the start date
    #[arg(long)]
    pub end: Option<String>,

    /// Only list trading days
    #[arg(long, default_value_t = false)]
    pub trading_only: bool,
}

/// One listed date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CalendarRow {
    date: NaiveDate,
    weekday: String,
    class: String,
    trading: bool,
    expected_publication: Option<String>,
}

impl CalendarArgs {
    /// Execute the calendar command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = cli.load_config()?;
        let calendar = config.build_calendar(cli.holidays.as_deref())?;

        let today = calendar.today(Utc::now());
        let start = parse_date_arg(self.start.as_deref(), today, "start")?;
        let end = parse_date_arg(self.end.as_deref(), start, "end")?;
        let span = DateSpan::new(start, end)?;

        let rows = self.rows(&calendar, &span);
        match cli.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&rows)
                    .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
                println!("{json}");
            }
            OutputFormat::Human => {
                println!("Holiday table: {}", calendar.holidays().label());
                for row in &rows {
                    println!(
                        "  {}  {}  {:<40} {}",
                        row.date,
                        row.weekday,
                        row.class,
                        row.expected_publication.as_deref().unwrap_or("-")
                    );
                }
                let trading = rows.iter().filter(|row| row.trading).count();
                println!("\n{trading} trading day(s) in {span}");
            }
        }
        Ok(())
    }

    fn rows(&self, calendar: &TradingCalendar, span: &DateSpan) -> Vec<CalendarRow> {
        span.days()
            .map(|date| calendar.classify(date))
            .filter(|day| !self.trading_only || day.class.is_trading())
            .map(|day| CalendarRow {
                date: day.date,
                weekday: day.date.format("%a").to_string(),
                class: day.class.to_string(),
                trading: day.class.is_trading(),
                expected_publication: match day.class {
                    DayClass::TradingDay => {
                        Some(calendar.expected_publication(day.date).to_rfc3339())
                    }
                    _ => None,
                },
            })
            .collect()
    }
}
