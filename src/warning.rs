//! Per-file problems collected alongside scan and consolidation results.
//!
//! A single unreadable file never fails a batch. Instead the problem is
//! logged and recorded here so callers can show or export it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The step that failed for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Directory traversal or metadata lookup
    Walk,
    /// Content hashing or byte comparison
    Hash,
    /// Pre-removal content check
    Verify,
    /// Reference file read or write
    Rewrite,
    /// File deletion
    Delete,
    /// Move into the archive directory
    Archive,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Walk => "walk",
            Self::Hash => "hash",
            Self::Verify => "verify",
            Self::Rewrite => "rewrite",
            Self::Delete => "delete",
            Self::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// A non-fatal, per-file failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileWarning {
    /// File or directory the problem refers to
    pub path: PathBuf,
    /// Step that failed
    pub operation: Operation,
    /// Human-readable description
    pub message: String,
}

impl FileWarning {
    /// Create a new warning.
    #[must_use]
    pub fn new(path: &Path, operation: Operation, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            operation,
            message: message.into(),
        }
    }
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {}: {}",
            self.operation,
            self.path.display(),
            self.message
        )
    }
}
