//! Unit tests for holiday table loading

use bhavcopy_downloader::calendar::{HolidayError, HolidayTable};
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_bundled_table_matches_shipped_file() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/holidays/nse-2025.toml");
    let loaded = HolidayTable::load(&path).unwrap();
    let bundled = HolidayTable::bundled().unwrap();

    assert_eq!(loaded.len(), bundled.len());
    assert_eq!(
        loaded.iter().collect::<Vec<_>>(),
        bundled.iter().collect::<Vec<_>>()
    );
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
label = "Custom"
years = [2026]

[[holiday]]
date = "2026-01-26"
name = "Republic Day"
"#
    )
    .unwrap();

    let table = HolidayTable::load(file.path()).unwrap();
    assert_eq!(table.label(), "Custom");
    assert_eq!(table.lookup(date(2026, 1, 26)), Some("Republic Day"));
    assert!(table.covers_year(2026));
    assert!(!table.covers_year(2025));
}

#[test]
fn test_missing_file_is_error() {
    let result = HolidayTable::load(std::path::Path::new("/nonexistent/holidays.toml"));
    assert!(result.is_err());
}

#[test]
fn test_entry_outside_declared_years_rejected() {
    let content = r#"
years = [2025]

[[holiday]]
date = "2026-01-26"
name = "Republic Day"
"#;
    assert!(matches!(
        HolidayTable::from_toml_str(content),
        Err(HolidayError::OutOfScope { .. })
    ));
}

#[test]
fn test_duplicate_date_rejected() {
    let content = r#"
years = [2025]

[[holiday]]
date = "2025-12-25"
name = "Christmas"

[[holiday]]
date = "2025-12-25"
name = "Christmas again"
"#;
    assert!(matches!(
        HolidayTable::from_toml_str(content),
        Err(HolidayError::Duplicate(_))
    ));
}

#[test]
fn test_malformed_date_rejected() {
    let content = r#"
years = [2025]

[[holiday]]
date = "25/12/2025"
name = "Christmas"
"#;
    assert!(HolidayTable::from_toml_str(content).is_err());
}
