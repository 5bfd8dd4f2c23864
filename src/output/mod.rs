//! Output archive and file naming
//!
//! - [`archive::OutputArchive`] - in-memory ZIP the run aggregates into
//! - [`archive::FinishedArchive`] - sealed, immutable result
//! - [`path`] - entry and bundle file names

pub mod archive;
pub mod path;

pub use archive::{FinishedArchive, OutputArchive};
pub use path::{bundle_file_name, entry_name};

/// Output archive errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// An entry with this name was already added
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// Adding the payload would exceed the configured size cap
    #[error("archive capacity exceeded: {attempted} bytes requested, limit {limit}")]
    CapacityExceeded {
        /// Configured cap in bytes
        limit: u64,
        /// Payload total the write would have reached
        attempted: u64,
    },

    /// ZIP encoding error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
