//! Human-readable terminal summary.
//!
//! One block per group, canonical member first and marked `keep`, followed by
//! totals and any warnings. Colour comes from `yansi` and is switched off
//! globally by `--no-color` / `NO_COLOR`.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::ConsolidateReport;
use crate::duplicates::ScanReport;
use crate::warning::FileWarning;

/// Format a byte count with IEC units.
///
/// # Example
///
/// ```
/// use asset_tidy::output::text::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert!(format_size(1024 * 1024).contains("MiB"));
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Write the scan summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_scan_summary<W: Write>(writer: &mut W, report: &ScanReport) -> io::Result<()> {
    if report.groups.is_empty() {
        writeln!(
            writer,
            "{} No duplicates found among {} files.",
            "✓".green(),
            report.total_files
        )?;
        write_warnings(writer, &report.warnings)?;
        return Ok(());
    }

    for (index, group) in report.groups.iter().enumerate() {
        writeln!(
            writer,
            "{} {} ({} each, {} copies)",
            format!("Group {}", index + 1).bold(),
            group.hash_hex()[..12].dim(),
            format_size(group.size),
            group.len()
        )?;
        writeln!(
            writer,
            "  {} {}",
            "keep".green(),
            group.canonical().display()
        )?;
        for duplicate in group.duplicates() {
            writeln!(writer, "  {}  {}", "dup".yellow(), duplicate.display())?;
        }
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} files scanned, {} duplicate groups, {} duplicate files, {} reclaimable",
        report.total_files,
        report.groups.len(),
        report.total_duplicates,
        format_size(report.total_savings).bold()
    )?;
    write_warnings(writer, &report.warnings)
}

/// Write the consolidation outcome.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_consolidate_summary<W: Write>(
    writer: &mut W,
    report: &ConsolidateReport,
    archived: bool,
) -> io::Result<()> {
    let verb = if archived { "Archived" } else { "Deleted" };
    writeln!(
        writer,
        "{} {} {} files, updated references in {} files.",
        "✓".green(),
        verb,
        report.removed_count,
        report.references_updated
    )?;
    write_warnings(writer, &report.warnings)
}

fn write_warnings<W: Write>(writer: &mut W, warnings: &[FileWarning]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(writer, "{} {} warnings:", "!".yellow(), warnings.len())?;
    for warning in warnings {
        writeln!(writer, "  {warning}")?;
    }
    Ok(())
}
