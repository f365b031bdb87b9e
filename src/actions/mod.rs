//! File actions module.
//!
//! This module implements consolidation of scanned duplicate groups:
//! - Reference rewriting from duplicate names to canonical names
//! - Permanent deletion of non-canonical members
//! - Archiving of non-canonical members with collision-free names
//!
//! # Ordering
//!
//! [`consolidate`] always runs in the same order: build the replacement map
//! for every group, rewrite references, then remove files. References never
//! observe a half-consolidated tree.
//!
//! ```no_run
//! use asset_tidy::actions::{consolidate, ConsolidateOptions, RemovalAction};
//! use asset_tidy::duplicates::scan;
//! use std::path::{Path, PathBuf};
//!
//! let report = scan(Path::new("public"), true).unwrap();
//! let options = ConsolidateOptions::default()
//!     .with_removal(RemovalAction::Delete)
//!     .with_reference_dirs(vec![PathBuf::from("src")]);
//!
//! let result = consolidate(&report.groups, &options).unwrap();
//! println!("removed {}, rewrote {}", result.removed_count, result.references_updated);
//! ```

pub mod archive;
pub mod delete;
pub mod references;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::progress::{ProgressCallback, PHASE_REMOVING};
use crate::scanner::Hasher;
use crate::warning::{FileWarning, Operation};

pub use archive::{archive_file, available_archive_path, ArchiveError};
pub use delete::{delete_file, validate_preserves_copy, verify_unchanged, DeleteError, DeleteResult};
pub use references::{
    rewrite_references, ReplacementMap, RewriteSummary, Rewriter, DEFAULT_REFERENCE_EXTENSIONS,
};

/// What to do with non-canonical members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalAction {
    /// Delete permanently.
    Delete,
    /// Move into the given directory.
    Archive(PathBuf),
}

/// Options for [`consolidate`].
#[derive(Clone)]
pub struct ConsolidateOptions {
    /// Removal action; `None` makes consolidation a no-op.
    pub removal: Option<RemovalAction>,
    /// Directories whose text files get their references rewritten.
    pub reference_dirs: Vec<PathBuf>,
    /// Extensions eligible for rewriting (case-insensitive, no dot).
    pub reference_extensions: Vec<String>,
    /// Re-hash each file right before removing it.
    pub verify_before_remove: bool,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ConsolidateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsolidateOptions")
            .field("removal", &self.removal)
            .field("reference_dirs", &self.reference_dirs)
            .field("reference_extensions", &self.reference_extensions)
            .field("verify_before_remove", &self.verify_before_remove)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            removal: None,
            reference_dirs: Vec::new(),
            reference_extensions: DEFAULT_REFERENCE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            verify_before_remove: false,
            progress_callback: None,
        }
    }
}

impl ConsolidateOptions {
    /// Set the removal action.
    #[must_use]
    pub fn with_removal(mut self, removal: RemovalAction) -> Self {
        self.removal = Some(removal);
        self
    }

    /// Set the reference directories.
    #[must_use]
    pub fn with_reference_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.reference_dirs = dirs;
        self
    }

    /// Replace the extension allow-list.
    #[must_use]
    pub fn with_reference_extensions(mut self, extensions: Vec<String>) -> Self {
        self.reference_extensions = extensions;
        self
    }

    /// Enable re-verification before removal.
    #[must_use]
    pub fn with_verify_before_remove(mut self, enabled: bool) -> Self {
        self.verify_before_remove = enabled;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Result of [`consolidate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidateReport {
    /// Non-canonical files deleted or archived
    pub removed_count: usize,
    /// Reference files whose content changed
    pub references_updated: usize,
    /// Per-file failures
    pub warnings: Vec<FileWarning>,
}

/// Errors that prevent consolidation from starting.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// The archive path exists and is not a directory.
    #[error("archive path is not a directory: {0}")]
    ArchiveNotADirectory(PathBuf),

    /// The archive directory could not be created.
    #[error("failed to create archive directory {path}: {source}")]
    ArchiveCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Consolidate duplicate groups: rewrite references, then remove every
/// non-canonical member.
///
/// Returns zero counts without touching anything when no removal action is
/// set. Per-file failures are collected as warnings and never abort the run.
///
/// # Errors
///
/// Returns [`ConsolidateError`] if the archive directory is unusable. This is
/// checked before any file is modified.
pub fn consolidate(
    groups: &[DuplicateGroup],
    options: &ConsolidateOptions,
) -> Result<ConsolidateReport, ConsolidateError> {
    let mut report = ConsolidateReport::default();

    let Some(removal) = options.removal.as_ref() else {
        log::debug!("No removal action, skipping consolidation");
        return Ok(report);
    };

    if let RemovalAction::Archive(dir) = removal {
        prepare_archive_dir(dir)?;
    }

    let (map, map_warnings) = ReplacementMap::build(groups);
    report.warnings.extend(map_warnings);
    log::info!("Built replacement map with {} entries", map.len());

    let progress = options.progress_callback.as_deref();
    let rewrite = rewrite_references(
        &options.reference_dirs,
        &map,
        &options.reference_extensions,
        progress,
    );
    report.references_updated = rewrite.files_updated;
    log::info!(
        "Updated references in {} of {} files",
        rewrite.files_updated,
        rewrite.files_scanned
    );
    report.warnings.extend(rewrite.warnings);

    let hasher = Hasher::new();
    let total: usize = groups.iter().map(DuplicateGroup::duplicate_count).sum();
    if let Some(cb) = progress {
        cb.on_phase_start(PHASE_REMOVING, total);
    }

    let mut processed = 0;
    for group in groups {
        if group.len() < 2 {
            continue;
        }
        let canonical = group.canonical();
        let selected = group.duplicates();

        if let Err(e) = validate_preserves_copy(selected, &group.files) {
            report
                .warnings
                .push(FileWarning::new(canonical, Operation::Delete, e.to_string()));
            continue;
        }

        for path in selected {
            processed += 1;
            if let Some(cb) = progress {
                cb.on_progress(processed, &path.to_string_lossy());
            }

            if path == canonical {
                continue;
            }

            if options.verify_before_remove {
                if let Err(e) = verify_unchanged(path, canonical, &group.hash, &hasher) {
                    report
                        .warnings
                        .push(FileWarning::new(path, Operation::Verify, e.to_string()));
                    continue;
                }
            }

            let outcome = match removal {
                RemovalAction::Delete => delete_file(path)
                    .map(|_| ())
                    .map_err(|e| FileWarning::new(path, Operation::Delete, e.to_string())),
                RemovalAction::Archive(dir) => archive_file(path, dir)
                    .map(|_| ())
                    .map_err(|e| FileWarning::new(path, Operation::Archive, e.to_string())),
            };

            match outcome {
                Ok(()) => report.removed_count += 1,
                Err(warning) => {
                    log::warn!("{}", warning);
                    report.warnings.push(warning);
                }
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end(PHASE_REMOVING);
    }

    log::info!(
        "Consolidation complete: {} removed, {} reference files updated, {} warnings",
        report.removed_count,
        report.references_updated,
        report.warnings.len()
    );

    Ok(report)
}

fn prepare_archive_dir(dir: &std::path::Path) -> Result<(), ConsolidateError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConsolidateError::ArchiveNotADirectory(dir.to_path_buf())),
        Err(_) => std::fs::create_dir_all(dir).map_err(|source| ConsolidateError::ArchiveCreate {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
