//! Moving duplicates into an archive directory.
//!
//! A moved file keeps its name unless the archive already holds one; then
//! the smallest free `stem_N.ext` (N = 1, 2, ...) is used. The choice only
//! depends on what is in the archive directory at the time of the move.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Source file was not found.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Source path has no file name component.
    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),

    /// Moving the file failed.
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pick the destination for `file_name` inside `archive_dir`.
///
/// # Example
///
/// ```
/// use asset_tidy::actions::archive::available_archive_path;
/// use std::ffi::OsStr;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("logo.png"), b"x").unwrap();
///
/// let next = available_archive_path(dir.path(), OsStr::new("logo.png"));
/// assert_eq!(next, dir.path().join("logo_1.png"));
/// ```
#[must_use]
pub fn available_archive_path(archive_dir: &Path, file_name: &std::ffi::OsStr) -> PathBuf {
    let candidate = archive_dir.join(file_name);
    if !exists(&candidate) {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map_or_else(|| file_name.to_os_string(), std::ffi::OsStr::to_os_string);
    let extension = as_path.extension();

    let mut n: u64 = 1;
    loop {
        let mut name = OsString::from(&stem);
        name.push(format!("_{n}"));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = archive_dir.join(name);
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Broken symlinks count as taken names.
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Move `path` into `archive_dir`, returning the final destination.
///
/// Falls back to copy + remove when a plain rename fails, which covers
/// archive directories on another filesystem.
///
/// # Errors
///
/// Returns an [`ArchiveError`] if the source is missing or cannot be moved.
pub fn archive_file(path: &Path, archive_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ArchiveError::NoFileName(path.to_path_buf()))?;

    if !path.is_file() {
        return Err(ArchiveError::NotFound(path.to_path_buf()));
    }

    let destination = available_archive_path(archive_dir, file_name);

    if let Err(rename_err) = fs::rename(path, &destination) {
        log::debug!(
            "Rename {} -> {} failed ({}), trying copy",
            path.display(),
            destination.display(),
            rename_err
        );
        let move_error = |source| ArchiveError::Move {
            from: path.to_path_buf(),
            to: destination.clone(),
            source,
        };
        fs::copy(path, &destination).map_err(|_| move_error(rename_err))?;
        if let Err(e) = fs::remove_file(path) {
            let _ = fs::remove_file(&destination);
            return Err(move_error(e));
        }
    }

    log::info!("Archived: {} -> {}", path.display(), destination.display());
    Ok(destination)
}
