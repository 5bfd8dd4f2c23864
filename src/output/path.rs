//! File names for archive entries and bundles
//!
//! ```rust
//! use bhavcopy_downloader::output::{bundle_file_name, entry_name};
//! use bhavcopy_downloader::DateSpan;
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
//! assert_eq!(entry_name(day), "BhavCopy_20250108.zip");
//!
//! let span = DateSpan::new(day, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()).unwrap();
//! assert_eq!(bundle_file_name(&span), "BhavCopy_Pro_2025-01-08_to_2025-01-10.zip");
//! ```

use chrono::NaiveDate;

use crate::span::DateSpan;

/// Name of the entry holding the archive for `date`
pub fn entry_name(date: NaiveDate) -> String {
    format!("BhavCopy_{}.zip", date.format("%Y%m%d"))
}

/// Default file name for the bundle covering `span`
pub fn bundle_file_name(span: &DateSpan) -> String {
    format!(
        "BhavCopy_Pro_{}_to_{}.zip",
        span.start().format("%Y-%m-%d"),
        span.end().format("%Y-%m-%d")
    )
}
