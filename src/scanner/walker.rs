//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing asset trees and
//! collecting file metadata for duplicate detection and reference rewriting.
//!
//! # Features
//!
//! - Recursive or single-level traversal
//! - Configurable symlink following with loop detection
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden file filtering
//! - Graceful shutdown via atomic flag
//! - Deterministic (file-name sorted) output
//!
//! Errors for individual entries are yielded rather than stopping the walk,
//! so an unreadable subdirectory never aborts a scan.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build a matcher from the configured ignore patterns.
    ///
    /// Only explicit patterns filter; `.gitignore` files found in the tree are
    /// ordinary files here.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Decide whether the walk should descend into / yield this entry.
    fn should_visit(&self, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        if self.config.skip_hidden && is_hidden(entry) {
            log::trace!("Skipping hidden entry: {}", entry.path().display());
            return false;
        }

        if let Some(gi) = gitignore {
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let is_dir = entry.file_type().is_dir();
            if gi.matched_path_or_any_parents(relative, is_dir).is_ignore() {
                log::trace!("Ignoring: {}", entry.path().display());
                return false;
            }
        }

        true
    }

    /// Walk the directory tree, yielding regular files.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }

        walk_dir
            .into_iter()
            .filter_entry(move |entry| self.should_visit(entry, gitignore.as_ref()))
            .filter_map(move |entry_result| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return None;
                }

                match entry_result {
                    Ok(entry) => self.process_entry(&entry),
                    Err(e) => Some(Err(self.convert_walk_error(e))),
                }
            })
    }

    /// Turn a directory entry into a [`FileEntry`] when it is a regular file.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        // With follow_links disabled walkdir reports the link itself.
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.convert_walk_error(e))),
        };

        if !metadata.is_file() {
            return None;
        }

        Some(Ok(FileEntry::new(entry.path().to_path_buf(), metadata.len())))
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn convert_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if error.loop_ancestor().is_some() {
            log::warn!("Symlink loop detected: {}", path.display());
            return ScanError::SymlinkLoop(path);
        }

        match error.into_io_error() {
            Some(io) => match io.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    log::warn!("Permission denied: {}", path.display());
                    ScanError::PermissionDenied(path)
                }
                std::io::ErrorKind::NotFound => {
                    log::debug!("Entry vanished during walk: {}", path.display());
                    ScanError::NotFound(path)
                }
                _ => {
                    log::warn!("I/O error for {}: {}", path.display(), io);
                    ScanError::Io { path, source: io }
                }
            },
            None => ScanError::Io {
                path,
                source: std::io::Error::other("directory walk failed"),
            },
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
