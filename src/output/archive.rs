//! In-memory ZIP aggregation
//!
//! Daily payloads are already ZIP files, so entries are stored without
//! recompression. Entry timestamps are fixed, which makes the sealed bytes a
//! pure function of the entries added: the same dates and payloads always
//! produce the same archive.

use bytes::Bytes;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::path::entry_name;
use super::{OutputError, OutputResult};

/// Append-only ZIP under construction
pub struct OutputArchive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: Vec<String>,
    names: BTreeSet<String>,
    payload_bytes: u64,
    max_bytes: Option<u64>,
}

impl std::fmt::Debug for OutputArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputArchive")
            .field("entries", &self.entries)
            .field("payload_bytes", &self.payload_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

impl Default for OutputArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputArchive {
    /// Empty archive with no size cap
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::default());

        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            entries: Vec::new(),
            names: BTreeSet::new(),
            payload_bytes: 0,
            max_bytes: None,
        }
    }

    /// Cap the total payload bytes the archive accepts
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Add the archive for `date`, returning its entry name.
    ///
    /// On error the archive is left as it was before the call.
    pub fn add(&mut self, date: NaiveDate, payload: &[u8]) -> OutputResult<String> {
        let name = entry_name(date);
        if self.names.contains(&name) {
            return Err(OutputError::DuplicateEntry(name));
        }

        let attempted = self.payload_bytes + payload.len() as u64;
        if let Some(limit) = self.max_bytes {
            if attempted > limit {
                return Err(OutputError::CapacityExceeded { limit, attempted });
            }
        }

        self.writer.start_file(name.as_str(), self.options)?;
        if let Err(e) = self.writer.write_all(payload) {
            self.writer.abort_file()?;
            return Err(e.into());
        }

        debug!(entry = %name, bytes = payload.len(), "Added archive entry");
        self.payload_bytes = attempted;
        self.names.insert(name.clone());
        self.entries.push(name.clone());
        Ok(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payload bytes added so far
    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    /// Seal the archive
    pub fn finish(self) -> OutputResult<FinishedArchive> {
        let cursor = self.writer.finish()?;
        let bytes = Bytes::from(cursor.into_inner());
        debug!(
            entries = self.entries.len(),
            bytes = bytes.len(),
            "Sealed output archive"
        );
        Ok(FinishedArchive {
            bytes,
            entries: self.entries,
        })
    }
}

/// Sealed archive bytes and their entry names in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedArchive {
    bytes: Bytes,
    entries: Vec<String>,
}

impl FinishedArchive {
    /// Complete ZIP bytes
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Take the ZIP bytes
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Entry names in insertion (date) order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to download
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    /// Write the ZIP bytes to `path`
    pub fn write_to(&self, path: &Path) -> OutputResult<()> {
        std::fs::write(path, &self.bytes)?;
        debug!(path = %path.display(), bytes = self.bytes.len(), "Wrote archive");
        Ok(())
    }
}
