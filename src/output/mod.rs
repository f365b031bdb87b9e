//! Output formatters for scan and consolidation results.
//!
//! - JSON for `--output-file` and automation
//! - Plain text summary for the terminal
//!
//! # Example
//!
//! ```no_run
//! use asset_tidy::duplicates::scan;
//! use asset_tidy::output::json::JsonReport;
//! use std::path::Path;
//!
//! let report = scan(Path::new("public"), true).unwrap();
//! let output = JsonReport::from_scan(&report, None);
//! println!("{}", serde_json::to_string_pretty(&output).unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonFailure, JsonOutputError, JsonReport};
pub use text::{format_size, write_consolidate_summary, write_scan_summary};
