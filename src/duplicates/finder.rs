//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the read-only detection pipeline:
//! 1. **Walk** - Collect regular files under the root
//! 2. **Size grouping** - Bucket by size, drop singletons
//!    (see [`crate::duplicates::groups`])
//! 3. **Full hash** - BLAKE3 over the whole content of every candidate
//! 4. **Grouping** - Materialise hash buckets of 2+ as [`DuplicateGroup`]s
//!
//! Hashing runs on a bounded rayon pool. The output is sorted afterwards,
//! so it does not depend on which hash finished first.
//!
//! # Example
//!
//! ```no_run
//! use asset_tidy::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let report = finder.scan(Path::new("public")).unwrap();
//!
//! println!("{} duplicate groups", report.groups.len());
//! println!("{} bytes reclaimable", report.total_savings);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{compare_paths, group_by_size, DuplicateGroup};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{files_identical, FileEntry, Hash, HashError, Hasher, Walker, WalkerConfig};
use crate::warning::{FileWarning, Operation};

/// Default number of hashing threads; kept low to avoid disk thrashing.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Number of threads used for hashing.
    pub io_threads: usize,
    /// Confirm hash matches with a byte-for-byte comparison.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            io_threads: DEFAULT_IO_THREADS,
            paranoid: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable byte-by-byte verification after hash matching.
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set whether subdirectories are scanned.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.walker_config.recursive = recursive;
        self
    }

    /// Replace the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Result of a scan.
///
/// Groups are ordered by canonical path and each group's files are sorted,
/// so two scans of an unchanged tree compare equal (apart from timing).
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Confirmed duplicate groups
    pub groups: Vec<DuplicateGroup>,
    /// Number of regular files enumerated under the root
    pub total_files: usize,
    /// Sum over groups of (members - 1)
    pub total_duplicates: usize,
    /// Sum over groups of size * (members - 1)
    pub total_savings: u64,
    /// Per-file problems that excluded a file from consideration
    pub warnings: Vec<FileWarning>,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
}

impl ScanReport {
    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    fn finalize(&mut self) {
        self.total_duplicates = self.groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.total_savings = self.groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Errors that fail a scan as a whole.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Duplicate finder that runs the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all groups of byte-identical files under `root`.
    ///
    /// Only reads the filesystem. Unreadable entries and files that fail to
    /// hash are excluded and reported in [`ScanReport::warnings`].
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist
    /// - The path is not a directory
    /// - The scan is interrupted by shutdown signal
    pub fn scan(&self, root: &Path) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();
        let mut report = ScanReport::default();

        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(FinderError::NotADirectory(root.to_path_buf())),
            Err(_) => return Err(FinderError::PathNotFound(root.to_path_buf())),
        }

        log::info!("Scanning {} for duplicates", root.display());

        let files = self.collect_files(root, &mut report.warnings)?;
        report.total_files = files.len();
        log::info!("Found {} files", report.total_files);

        let (size_groups, _) = group_by_size(files);
        if size_groups.is_empty() {
            log::info!("No files share a size, scan complete");
            report.scan_duration = start_time.elapsed();
            return Ok(report);
        }

        let hash_groups = self.hash_candidates(size_groups, &mut report.warnings)?;

        let mut groups = Vec::new();
        for (hash, files) in hash_groups {
            if files.len() < 2 {
                continue;
            }
            if self.config.paranoid {
                groups.extend(self.split_by_content(hash, files, &mut report.warnings));
            } else {
                groups.push(build_group(hash, files));
            }
        }

        groups.sort_by(|a, b| compare_paths(a.canonical(), b.canonical()));
        report.groups = groups;
        report.finalize();
        report.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} duplicates, {} bytes reclaimable",
            report.groups.len(),
            report.total_duplicates,
            report.total_savings
        );

        Ok(report)
    }

    /// Walk the root and collect regular files, recording walk failures.
    fn collect_files(
        &self,
        root: &Path,
        warnings: &mut Vec<FileWarning>,
    ) -> Result<Vec<FileEntry>, FinderError> {
        let progress = self.config.progress_callback.as_deref();
        if let Some(cb) = progress {
            cb.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    files.push(file);
                    if let Some(cb) = progress {
                        cb.on_progress(files.len(), &files[files.len() - 1].path.to_string_lossy());
                    }
                }
                Err(e) => warnings.push(FileWarning::new(e.path(), Operation::Walk, e.to_string())),
            }
        }

        if let Some(cb) = progress {
            cb.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        Ok(files)
    }

    /// Hash every file in the size buckets and regroup them by hash.
    fn hash_candidates(
        &self,
        size_groups: HashMap<u64, Vec<FileEntry>>,
        warnings: &mut Vec<FileWarning>,
    ) -> Result<HashMap<Hash, Vec<FileEntry>>, FinderError> {
        let candidates: Vec<FileEntry> = size_groups.into_values().flatten().collect();
        let total = candidates.len();
        let progress = self.config.progress_callback.as_deref();

        if let Some(cb) = progress {
            cb.on_phase_start(PHASE_HASHING, total);
        }
        log::info!(
            "Hashing {} candidates on {} threads",
            total,
            self.config.io_threads
        );

        let completed = AtomicUsize::new(0);
        let hash_one = |file: FileEntry| -> (FileEntry, Result<Hash, HashError>) {
            let result = self.hasher.full_hash(&file.path);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress {
                cb.on_progress(done, &file.path.to_string_lossy());
            }
            (file, result)
        };

        let results: Vec<(FileEntry, Result<Hash, HashError>)> =
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.io_threads)
                .build()
            {
                Ok(pool) => pool.install(|| candidates.into_par_iter().map(&hash_one).collect()),
                Err(e) => {
                    log::warn!("Failed to create hashing pool, using global pool: {}", e);
                    candidates.into_par_iter().map(&hash_one).collect()
                }
            };

        if let Some(cb) = progress {
            cb.on_phase_end(PHASE_HASHING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Hashing interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut hash_groups: HashMap<Hash, Vec<FileEntry>> = HashMap::new();
        for (file, result) in results {
            match result {
                Ok(hash) => hash_groups.entry(hash).or_default().push(file),
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                    warnings.push(FileWarning::new(&file.path, Operation::Hash, e.to_string()));
                }
            }
        }

        Ok(hash_groups)
    }

    /// Split a hash bucket into groups of truly identical content.
    fn split_by_content(
        &self,
        hash: Hash,
        mut files: Vec<FileEntry>,
        warnings: &mut Vec<FileWarning>,
    ) -> Vec<DuplicateGroup> {
        files.sort_by(|a, b| compare_paths(&a.path, &b.path));
        let mut clusters: Vec<Vec<FileEntry>> = Vec::new();

        'files: for file in files {
            for cluster in &mut clusters {
                match files_identical(&cluster[0].path, &file.path) {
                    Ok(true) => {
                        cluster.push(file);
                        continue 'files;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("Byte comparison failed: {}", e);
                        warnings.push(FileWarning::new(e.path(), Operation::Verify, e.to_string()));
                        // An unreadable candidate is dropped; an unreadable
                        // cluster head only rules out this cluster.
                        if e.path() == file.path.as_path() {
                            continue 'files;
                        }
                    }
                }
            }
            clusters.push(vec![file]);
        }

        if clusters.len() > 1 {
            log::warn!(
                "Hash collision detected for {}: {} distinct contents",
                crate::scanner::hash_to_hex(&hash),
                clusters.len()
            );
        }

        clusters
            .into_iter()
            .filter(|c| c.len() > 1)
            .map(|c| build_group(hash, c))
            .collect()
    }
}

fn build_group(hash: Hash, files: Vec<FileEntry>) -> DuplicateGroup {
    let size = files.first().map_or(0, |f| f.size);
    let paths = files.into_iter().map(|f| f.path).collect();
    let group = DuplicateGroup::new(hash, size, paths);
    log::debug!(
        "Duplicate group {}: {} files, {} bytes each, keeping {}",
        group.hash_hex(),
        group.len(),
        size,
        group.canonical().display()
    );
    group
}

/// Scan `root` with default settings.
///
/// # Errors
///
/// See [`DuplicateFinder::scan`].
pub fn scan(root: &Path, recursive: bool) -> Result<ScanReport, FinderError> {
    DuplicateFinder::new(FinderConfig::default().with_recursive(recursive)).scan(root)
}
