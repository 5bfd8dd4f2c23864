//! Year-scoped holiday reference data.
//!
//! A [`HolidayTable`] maps exact dates to occasion names for the years it
//! declares. It is loaded from TOML so the yearly list can be replaced
//! without rebuilding:
//!
//! ```toml
//! label = "NSE equity segment 2025"
//! years = [2025]
//!
//! [[holiday]]
//! date = "2025-02-26"
//! name = "Mahashivratri"
//! ```
//!
//! Dates in years the table does not declare are never holidays. A table
//! for 2025 says nothing about 2026, and lookups for 2026 dates miss.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Holiday table shipped with the crate
const BUNDLED_TABLE: &str = include_str!("../../config/holidays/nse-2025.toml");

/// Holiday table errors
#[derive(Debug, thiserror::Error)]
pub enum HolidayError {
    /// Table file could not be read
    #[error("failed to read holiday table {path:?}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Table file is not valid TOML for this schema
    #[error("invalid holiday table: {0}")]
    Parse(#[from] toml::de::Error),

    /// An entry falls in a year the table does not declare
    #[error("holiday {date} is outside the table's declared years {years:?}")]
    OutOfScope {
        /// Offending date
        date: NaiveDate,
        /// Years the table declares
        years: Vec<i32>,
    },

    /// Same date listed twice
    #[error("holiday {0} is listed more than once")]
    Duplicate(NaiveDate),

    /// Entry without an occasion name
    #[error("holiday {0} has an empty name")]
    EmptyName(NaiveDate),
}

/// One holiday row as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    /// Exact calendar date
    pub date: NaiveDate,
    /// Human-readable occasion name
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct HolidayFile {
    #[serde(default)]
    label: Option<String>,
    years: Vec<i32>,
    #[serde(default, rename = "holiday")]
    holidays: Vec<HolidayEntry>,
}

/// Immutable `date -> occasion name` mapping scoped to a set of years
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayTable {
    label: String,
    years: BTreeSet<i32>,
    by_date: BTreeMap<NaiveDate, String>,
}

impl HolidayTable {
    /// Table with no holidays and no covered years
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table, validating every entry against the declared years.
    pub fn new<Y, E>(label: impl Into<String>, years: Y, entries: E) -> Result<Self, HolidayError>
    where
        Y: IntoIterator<Item = i32>,
        E: IntoIterator<Item = HolidayEntry>,
    {
        let years: BTreeSet<i32> = years.into_iter().collect();
        let mut by_date = BTreeMap::new();

        for entry in entries {
            if !years.contains(&entry.date.year()) {
                return Err(HolidayError::OutOfScope {
                    date: entry.date,
                    years: years.iter().copied().collect(),
                });
            }
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(HolidayError::EmptyName(entry.date));
            }
            if by_date.insert(entry.date, name.to_string()).is_some() {
                return Err(HolidayError::Duplicate(entry.date));
            }
        }

        let table = Self {
            label: label.into(),
            years,
            by_date,
        };

        for date in table.weekend_entries() {
            warn!(
                table = %table.label,
                %date,
                "Holiday table lists a weekend date; weekend classification takes precedence"
            );
        }

        Ok(table)
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, HolidayError> {
        let file: HolidayFile = toml::from_str(content)?;
        let label = file
            .label
            .unwrap_or_else(|| format!("holidays {:?}", file.years));
        Self::new(label, file.years, file.holidays)
    }

    /// Load a table from a TOML file
    pub fn load(path: &Path) -> Result<Self, HolidayError> {
        let content = std::fs::read_to_string(path).map_err(|source| HolidayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            holidays = table.len(),
            years = ?table.years,
            "Loaded holiday table"
        );
        Ok(table)
    }

    /// The NSE 2025 table bundled with the crate (`config/holidays/nse-2025.toml`)
    pub fn bundled() -> Result<Self, HolidayError> {
        Self::from_toml_str(BUNDLED_TABLE)
    }

    /// Descriptive label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Occasion name if `date` is a listed holiday
    pub fn lookup(&self, date: NaiveDate) -> Option<&str> {
        self.by_date.get(&date).map(String::as_str)
    }

    /// Whether the table declares holidays for `year`
    pub fn covers_year(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    /// Declared years in ascending order
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }

    /// Number of holidays
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    /// Whether the table lists no holidays
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Holidays in date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str)> + '_ {
        self.by_date.iter().map(|(date, name)| (*date, name.as_str()))
    }

    /// Listed dates that fall on a Saturday or Sunday.
    ///
    /// Empty for a well-formed table.
    pub fn weekend_entries(&self) -> Vec<NaiveDate> {
        self.by_date
            .keys()
            .filter(|date| matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .copied()
            .collect()
    }
}
