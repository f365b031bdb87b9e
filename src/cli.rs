//! Command-line interface definitions for asset-tidy.
//!
//! Global options (verbosity, colour, error format, config file) come first,
//! followed by a subcommand.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates only
//! asset-tidy find-duplicates public
//!
//! # Delete duplicates and point references in src/ at the kept files
//! asset-tidy find-duplicates public --refs src,content --delete --yes
//!
//! # Move duplicates aside and save the report
//! asset-tidy find-duplicates public --archive .dupes --output-file dupes.json
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Find and consolidate duplicate assets.
///
/// Scans a directory for byte-identical files, keeps the lexicographically
/// first path of every group and, on request, deletes or archives the rest
/// after rewriting references to them.
#[derive(Debug, Parser)]
#[command(name = "asset-tidy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find duplicate files and optionally consolidate them
    FindDuplicates(FindDuplicatesArgs),
    /// Write a configuration file with the current settings
    InitConfig(InitConfigArgs),
}

/// Arguments for `find-duplicates`.
#[derive(Debug, Args)]
pub struct FindDuplicatesArgs {
    /// Directory to scan
    #[arg(value_name = "DIR")]
    pub path: PathBuf,

    /// Directories whose text files reference the scanned assets
    ///
    /// Comma-separated, may be repeated.
    #[arg(long = "refs", value_name = "DIRS", value_delimiter = ',')]
    pub refs: Vec<PathBuf>,

    /// Permanently delete duplicates
    #[arg(long, conflicts_with = "archive")]
    pub delete: bool,

    /// Move duplicates into this directory
    #[arg(long, value_name = "DIR")]
    pub archive: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Only scan direct children of DIR
    #[arg(long)]
    pub no_recursive: bool,

    /// Skip the confirmation prompt (required when stdin is not a terminal)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// Patterns use gitignore syntax and are matched relative to DIR.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links during scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of I/O threads for hashing (default: 4)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub io_threads: Option<usize>,

    /// Confirm hash matches with a byte-by-byte comparison
    #[arg(long)]
    pub paranoid: bool,

    /// Re-hash every duplicate right before removing it
    #[arg(long)]
    pub verify: bool,
}

impl FindDuplicatesArgs {
    /// Whether this run deletes or moves files.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.delete || self.archive.is_some()
    }
}

/// Arguments for `init-config`.
#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Where to write the file (defaults to the platform config directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
