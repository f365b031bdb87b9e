//! Rewriting textual references from duplicate names to canonical names.
//!
//! # Overview
//!
//! Before any duplicate is removed, every text file under the reference
//! directories has each duplicate's base name replaced with its canonical
//! base name. Matching is literal: names are regex-escaped, so `.` or `+` in
//! a file name only match themselves.
//!
//! All names are replaced in one leftmost-longest pass. A replacement never
//! feeds another one, so `logo_2.png -> logo.png` and `logo.png -> brand.png`
//! in the same map do not chain.
//!
//! # Example
//!
//! ```
//! use asset_tidy::actions::references::ReplacementMap;
//! use asset_tidy::duplicates::DuplicateGroup;
//! use std::path::PathBuf;
//!
//! let group = DuplicateGroup::new(
//!     [0; 32],
//!     5,
//!     vec![PathBuf::from("/public/a.txt"), PathBuf::from("/public/a_copy.txt")],
//! );
//! let (map, _warnings) = ReplacementMap::build(&[group]);
//! assert_eq!(map.get("a_copy.txt"), Some("a.txt"));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::duplicates::DuplicateGroup;
use crate::progress::{ProgressCallback, PHASE_REFERENCES};
use crate::scanner::{Walker, WalkerConfig};
use crate::warning::{FileWarning, Operation};

/// Extensions of files whose content may be rewritten.
///
/// Source code, stylesheets, markup, markdown and JSON-like data. Binary
/// formats are never opened for rewriting.
pub const DEFAULT_REFERENCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "css", "scss", "sass", "less", "html", "htm", "md",
    "mdx", "json", "yml", "yaml", "xml", "svg", "vue", "svelte", "txt",
];

/// Duplicate base name to canonical base name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: BTreeMap<String, String>,
}

impl ReplacementMap {
    /// Build the map across all groups.
    ///
    /// Duplicates whose base name equals the canonical's need no rewrite and
    /// are left out. When two duplicates share a base name but belong to
    /// groups with different canonical names, the first group wins and a
    /// warning is returned for the other.
    #[must_use]
    pub fn build(groups: &[DuplicateGroup]) -> (Self, Vec<FileWarning>) {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();
        let mut warnings = Vec::new();

        for group in groups {
            let Some(canonical) = group.files.first().and_then(|p| base_name(p)) else {
                continue;
            };

            for duplicate in group.duplicates() {
                let Some(name) = base_name(duplicate) else {
                    continue;
                };
                if name == canonical {
                    continue;
                }

                match entries.get(&name) {
                    Some(existing) if *existing != canonical => {
                        log::warn!(
                            "Conflicting replacement for {}: keeping {}, ignoring {}",
                            name,
                            existing,
                            canonical
                        );
                        warnings.push(FileWarning::new(
                            duplicate,
                            Operation::Rewrite,
                            format!(
                                "name '{name}' already maps to '{existing}', references will not point to '{canonical}'"
                            ),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        log::debug!("Replacement: {} -> {}", name, canonical);
                        entries.insert(name, canonical.clone());
                    }
                }
            }
        }

        (Self { entries }, warnings)
    }

    /// Number of names to replace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to replace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical name for a duplicate name.
    #[must_use]
    pub fn get(&self, duplicate: &str) -> Option<&str> {
        self.entries.get(duplicate).map(String::as_str)
    }

    /// Iterate over `(duplicate, canonical)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Compiled single-pass replacer for a [`ReplacementMap`].
#[derive(Debug)]
pub struct Rewriter {
    pattern: Option<Regex>,
    map: ReplacementMap,
}

impl Rewriter {
    /// Compile the map into one alternation, longest names first so the
    /// longest match wins at any position.
    ///
    /// # Errors
    ///
    /// Returns a regex error if the combined pattern exceeds regex size limits.
    pub fn new(map: ReplacementMap) -> Result<Self, regex::Error> {
        if map.is_empty() {
            return Ok(Self { pattern: None, map });
        }

        let mut names: Vec<&str> = map.entries.keys().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation)?;

        Ok(Self {
            pattern: Some(pattern),
            map,
        })
    }

    /// Replace every duplicate name in `content`.
    ///
    /// Returns `None` when nothing changed.
    #[must_use]
    pub fn rewrite(&self, content: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        if !pattern.is_match(content) {
            return None;
        }

        let mut output = String::with_capacity(content.len());
        let mut last = 0;
        for found in pattern.find_iter(content) {
            output.push_str(&content[last..found.start()]);
            match self.map.get(found.as_str()) {
                Some(canonical) => output.push_str(canonical),
                None => output.push_str(found.as_str()),
            }
            last = found.end();
        }
        output.push_str(&content[last..]);

        (output != content).then_some(output)
    }
}

/// Outcome of a rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Files whose content changed and was written back
    pub files_updated: usize,
    /// Candidate files examined
    pub files_scanned: usize,
    /// Per-file failures
    pub warnings: Vec<FileWarning>,
}

/// Collect rewrite candidates under `dirs`, filtered by extension.
fn collect_reference_files(
    dirs: &[PathBuf],
    extensions: &[String],
    warnings: &mut Vec<FileWarning>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            log::warn!("Reference directory not found: {}", dir.display());
            warnings.push(FileWarning::new(
                dir,
                Operation::Rewrite,
                "reference directory not found",
            ));
            continue;
        }

        for entry in Walker::new(dir, WalkerConfig::default()).walk() {
            match entry {
                Ok(file) if has_allowed_extension(&file.path, extensions) => files.push(file.path),
                Ok(_) => {}
                Err(e) => {
                    warnings.push(FileWarning::new(e.path(), Operation::Walk, e.to_string()));
                }
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

/// Rewrite references under `dirs` according to `map`.
///
/// Each file is read, rewritten in memory and written back only if its
/// content changed. Unreadable, non-UTF-8 or unwritable files are skipped
/// and reported as warnings.
#[must_use]
pub fn rewrite_references(
    dirs: &[PathBuf],
    map: &ReplacementMap,
    extensions: &[String],
    progress: Option<&dyn ProgressCallback>,
) -> RewriteSummary {
    let mut summary = RewriteSummary::default();
    if map.is_empty() || dirs.is_empty() {
        return summary;
    }

    let rewriter = match Rewriter::new(map.clone()) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to compile replacement pattern: {}", e);
            for dir in dirs {
                summary
                    .warnings
                    .push(FileWarning::new(dir, Operation::Rewrite, e.to_string()));
            }
            return summary;
        }
    };

    let files = collect_reference_files(dirs, extensions, &mut summary.warnings);
    summary.files_scanned = files.len();

    if let Some(cb) = progress {
        cb.on_phase_start(PHASE_REFERENCES, files.len());
    }

    for (index, path) in files.iter().enumerate() {
        if let Some(cb) = progress {
            cb.on_progress(index + 1, &path.to_string_lossy());
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Skipping reference file {}: {}", path.display(), e);
                summary
                    .warnings
                    .push(FileWarning::new(path, Operation::Rewrite, e.to_string()));
                continue;
            }
        };

        let Some(updated) = rewriter.rewrite(&content) else {
            continue;
        };

        match fs::write(path, updated) {
            Ok(()) => {
                log::info!("Updated references in {}", path.display());
                summary.files_updated += 1;
            }
            Err(e) => {
                log::warn!("Failed to write {}: {}", path.display(), e);
                summary
                    .warnings
                    .push(FileWarning::new(path, Operation::Rewrite, e.to_string()));
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end(PHASE_REFERENCES);
    }

    summary
}
