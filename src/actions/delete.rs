//! Deletion of non-canonical duplicates.
//!
//! # Overview
//!
//! This module provides:
//! - Permanent deletion of a single file
//! - Content verification before removal (TOCTOU protection)
//! - A guard that refuses any removal set leaving a group without a copy
//!
//! # Example
//!
//! ```no_run
//! use asset_tidy::actions::delete::delete_file;
//! use std::path::Path;
//!
//! match delete_file(Path::new("public/logo-copy.png")) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::{Hash, Hasher};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File content changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The canonical copy is gone, so removing this one would lose the content.
    #[error("canonical copy missing: {0}")]
    CanonicalMissing(PathBuf),

    /// Attempted to remove every copy of a group.
    #[error("cannot remove all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::CanonicalMissing(p)
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    pub(crate) fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn delete_file(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;

    log::info!("Deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
    })
}

/// Check that `path` still holds the content recorded at scan time and that
/// the canonical copy still exists.
///
/// # Errors
///
/// - `CanonicalMissing` if `canonical` no longer exists
/// - `Modified` if the content hash of `path` differs from `expected`
/// - `NotFound` / `PermissionDenied` / `Io` if `path` cannot be read
pub fn verify_unchanged(
    path: &Path,
    canonical: &Path,
    expected: &Hash,
    hasher: &Hasher,
) -> Result<(), DeleteError> {
    if !canonical.is_file() {
        log::warn!(
            "Canonical file {} vanished, keeping {}",
            canonical.display(),
            path.display()
        );
        return Err(DeleteError::CanonicalMissing(canonical.to_path_buf()));
    }

    let actual = hasher.full_hash(path).map_err(|e| match e {
        crate::scanner::HashError::NotFound(p) => DeleteError::NotFound(p),
        crate::scanner::HashError::PermissionDenied(p) => DeleteError::PermissionDenied(p),
        other => DeleteError::Io {
            path: path.to_path_buf(),
            source: io::Error::other(other.to_string()),
        },
    })?;

    if &actual != expected {
        log::warn!("File modified since scan: {}", path.display());
        return Err(DeleteError::Modified(path.to_path_buf()));
    }

    Ok(())
}

/// Validate that a removal set doesn't remove all copies of a group.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no member would be preserved.
///
/// # Example
///
/// ```
/// use asset_tidy::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/logo.png"), PathBuf::from("/logo-copy.png")];
///
/// assert!(validate_preserves_copy(&group[1..], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    use std::collections::HashSet;

    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to remove all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        Ok(())
    }
}
