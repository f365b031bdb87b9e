//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based candidate filtering
//! - Full-content hash comparison
//! - Duplicate group management and canonical selection

pub mod finder;
pub mod groups;

pub use finder::{
    scan, DuplicateFinder, FinderConfig, FinderError, ScanReport, DEFAULT_IO_THREADS,
};
pub use groups::{compare_paths, group_by_size, DuplicateGroup, GroupingStats};
