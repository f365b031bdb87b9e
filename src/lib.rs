//! asset-tidy - duplicate asset finder and consolidator
//!
//! Scans a static-asset tree for byte-identical files (BLAKE3 content
//! hashing), keeps the lexicographically first path of every group and, on
//! request, deletes or archives the other copies after rewriting textual
//! references to point at the kept file.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod scanner;
pub mod signal;
pub mod warning;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{consolidate, ConsolidateOptions, ConsolidateReport, RemovalAction};
use crate::cli::{Cli, Commands, FindDuplicatesArgs, InitConfigArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError, ScanReport};
use crate::error::ExitCode;
use crate::output::{JsonFailure, JsonReport};
use crate::progress::Progress;
use crate::prompt::Confirmation;
use crate::scanner::WalkerConfig;

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error for root-level failures (missing or non-directory scan
/// root, invalid configuration, unconfirmed destructive run without a
/// terminal, failed report write) and for interruption.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::FindDuplicates(args) => find_duplicates(&args, &config, cli.quiet),
        Commands::InitConfig(args) => init_config(&args, &config),
    }
}

fn find_duplicates(args: &FindDuplicatesArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let handler = signal::install_handler()?;
    let progress = Arc::new(Progress::new(quiet));

    let io_threads = args.io_threads.unwrap_or(config.io_threads);
    if io_threads == 0 {
        bail!("--io-threads must be at least 1");
    }

    let mut ignore_patterns = config.ignore_patterns.clone();
    ignore_patterns.extend(args.ignore_patterns.iter().cloned());

    let walker_config = WalkerConfig::default()
        .with_recursive(!args.no_recursive)
        .with_skip_hidden(args.skip_hidden || config.skip_hidden)
        .with_follow_symlinks(args.follow_symlinks || config.follow_symlinks)
        .with_ignore_patterns(ignore_patterns);

    let finder_config = FinderConfig::default()
        .with_walker_config(walker_config)
        .with_io_threads(io_threads)
        .with_paranoid(args.paranoid || config.paranoid)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone());

    let report = match DuplicateFinder::new(finder_config).scan(&args.path) {
        Ok(report) => report,
        Err(e) => {
            if let Some(ref path) = args.output_file {
                if let Err(write_err) = JsonFailure::new(e.to_string()).write_to_file(path) {
                    log::error!("Failed to write failure report: {}", write_err);
                }
            }
            return Err(e.into());
        }
    };

    if !quiet {
        output::write_scan_summary(&mut io::stdout().lock(), &report)?;
    }

    let consolidated = if args.is_destructive() {
        run_consolidation(args, config, &report, &handler, progress, quiet)?
    } else {
        None
    };

    if let Some(ref path) = args.output_file {
        JsonReport::from_scan(&report, consolidated.as_ref())
            .write_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    Ok(ExitCode::Success)
}

/// Confirm and run consolidation. `None` means the user declined.
fn run_consolidation(
    args: &FindDuplicatesArgs,
    config: &Config,
    report: &ScanReport,
    handler: &signal::ShutdownHandler,
    progress: Arc<Progress>,
    quiet: bool,
) -> Result<Option<ConsolidateReport>> {
    if !report.has_duplicates() {
        return Ok(Some(ConsolidateReport::default()));
    }

    let removal = match args.archive {
        Some(ref dir) => RemovalAction::Archive(dir.clone()),
        None => RemovalAction::Delete,
    };

    if !args.yes {
        let question = match removal {
            RemovalAction::Delete => format!(
                "Permanently delete {} duplicate files?",
                report.total_duplicates
            ),
            RemovalAction::Archive(ref dir) => format!(
                "Move {} duplicate files to {}?",
                report.total_duplicates,
                dir.display()
            ),
        };
        match prompt::confirm(&question)? {
            Confirmation::Accepted => {}
            Confirmation::Declined => {
                eprintln!("Aborted, no files were changed.");
                return Ok(None);
            }
            Confirmation::NonInteractive => {
                bail!("Refusing to modify files without confirmation; pass --yes in non-interactive use");
            }
        }
    }

    if handler.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }

    let options = ConsolidateOptions::default()
        .with_removal(removal.clone())
        .with_reference_dirs(args.refs.clone())
        .with_reference_extensions(config.reference_extensions.clone())
        .with_verify_before_remove(args.verify || config.verify_before_remove)
        .with_progress_callback(progress);

    let result = consolidate(&report.groups, &options)?;

    if !quiet {
        output::write_consolidate_summary(
            &mut io::stdout().lock(),
            &result,
            matches!(removal, RemovalAction::Archive(_)),
        )?;
    }

    Ok(Some(result))
}

fn init_config(args: &InitConfigArgs, config: &Config) -> Result<ExitCode> {
    let path = match args.path {
        Some(ref p) => p.clone(),
        None => Config::config_path()?,
    };

    if path.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }

    config.save(&path)?;
    println!("Wrote configuration to {}", path.display());
    Ok(ExitCode::Success)
}
