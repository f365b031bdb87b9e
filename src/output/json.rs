//! JSON report for `--output-file`.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "success": true,
//!   "groups": [
//!     { "hash": "abc123...", "files": ["public/a.txt", "public/a_copy.txt"], "size": 5 }
//!   ],
//!   "totalFiles": 2,
//!   "totalDuplicates": 1,
//!   "totalSavings": 5,
//!   "removedCount": 1,
//!   "referencesUpdated": 1
//! }
//! ```
//!
//! `removedCount` and `referencesUpdated` are present only when consolidation
//! ran. `warnings` is present only when non-empty. A failed run is written as
//! `{ "success": false, "error": "..." }`.
//!
//! # Example
//!
//! ```
//! use asset_tidy::duplicates::ScanReport;
//! use asset_tidy::output::json::JsonReport;
//!
//! let report = JsonReport::from_scan(&ScanReport::default(), None);
//! let json = serde_json::to_string(&report).unwrap();
//! assert!(json.contains("\"success\":true"));
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::actions::ConsolidateReport;
use crate::duplicates::{DuplicateGroup, ScanReport};
use crate::warning::FileWarning;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// Member paths, canonical first
    pub files: Vec<String>,
    /// File size in bytes
    pub size: u64,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            files: group
                .files
                .iter()
                .map(|f| f.to_string_lossy().into_owned())
                .collect(),
            size: group.size,
        }
    }
}

/// Successful run in JSON format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    /// Always `true`
    pub success: bool,
    /// Duplicate groups
    pub groups: Vec<JsonDuplicateGroup>,
    /// Regular files enumerated
    pub total_files: usize,
    /// Non-canonical members across all groups
    pub total_duplicates: usize,
    /// Reclaimable bytes
    pub total_savings: u64,
    /// Files deleted or archived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_count: Option<usize>,
    /// Reference files rewritten
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_updated: Option<usize>,
    /// Per-file problems from scan and consolidation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FileWarning>,
}

impl JsonReport {
    /// Build a report from a scan and, if it ran, a consolidation.
    #[must_use]
    pub fn from_scan(scan: &ScanReport, consolidated: Option<&ConsolidateReport>) -> Self {
        let mut warnings = scan.warnings.clone();
        if let Some(c) = consolidated {
            warnings.extend(c.warnings.iter().cloned());
        }

        Self {
            success: true,
            groups: scan
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            total_files: scan.total_files,
            total_duplicates: scan.total_duplicates,
            total_savings: scan.total_savings,
            removed_count: consolidated.map(|c| c.removed_count),
            references_updated: consolidated.map(|c| c.references_updated),
            warnings,
        }
    }

    /// Write pretty JSON to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), JsonOutputError> {
        write_json_file(self, path)
    }
}

/// Failed run in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// Always `false`
    pub success: bool,
    /// What went wrong
    pub error: String,
}

impl JsonFailure {
    /// Create a failure report.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }

    /// Write pretty JSON to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), JsonOutputError> {
        write_json_file(self, path)
    }
}

fn write_json_file<T: Serialize>(value: &T, path: &Path) -> Result<(), JsonOutputError> {
    let file = File::create(path).map_err(|source| JsonOutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|source| JsonOutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("Wrote JSON report to {}", path.display());
    Ok(())
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("failed to write {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
