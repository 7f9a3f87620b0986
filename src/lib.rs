//! rustbin - Recoverable rm
//!
//! A cross-platform CLI trash can: files are moved into a holding directory
//! instead of being deleted, and a persistent ledger records where each one
//! came from so the deletion can be undone.
//!
//! The interesting parts live in three modules:
//! - [`relocate`]: rename-or-copy file relocation with a cross-device
//!   fallback and read-only-resilient deletion
//! - [`disambiguate`]: the escalating suffix ladder that keeps collisions
//!   from ever overwriting a previous deletion
//! - [`ledger`]: the checksummed, versioned mapping from original path to
//!   trashed path
//!
//! [`can::TrashCan`] ties them together and is the API the CLI layer
//! consumes.
//!
//! # Limitations
//!
//! The ledger file is not locked: concurrent invocations against the same
//! trash directory can race and lose entries. Run one rustbin at a time per
//! trash directory.

pub mod can;
pub mod cli;
pub mod config;
pub mod disambiguate;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod relocate;

use anyhow::Result;
use yansi::Paint;

use crate::can::{TrashCan, TrashOptions, TrashOutcome};
use crate::cli::{Cli, Mode};
use crate::config::Config;
use crate::error::ExitCode;

/// Run the application logic for a parsed command line.
///
/// Batch processing is fail-soft per item: one bad path is reported and
/// counted, the rest still get processed. Only setup failures (unresolvable
/// trash directory, unreadable ledger) abort the run.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load();
    let trash_dir = config.resolve_trash_dir(cli.trash_dir.as_deref())?;

    match cli.mode() {
        Mode::Directory => {
            println!("{}", trash_dir.display());
            Ok(ExitCode::Success)
        }

        Mode::List => {
            let can = TrashCan::open(trash_dir)?;
            for (i, path) in can.list().iter().enumerate() {
                println!("{} {}", format!("{}:", i + 1).cyan(), path.display());
            }
            Ok(ExitCode::Success)
        }

        Mode::Empty => {
            let mut can = TrashCan::open(trash_dir)?;
            println!(
                "{}",
                format!(
                    "Warning: permanently deleting all files in {}",
                    can.trash_dir().display()
                )
                .red()
            );
            if cli.yes || cli::confirm("Confirm delete?") {
                can.empty()?;
            }
            Ok(ExitCode::Success)
        }

        Mode::Permanent => {
            require_paths(&cli)?;
            let can = TrashCan::open(trash_dir)?;
            println!("{}", "Warning: permanently deleting:".red());
            for (i, path) in cli.paths.iter().enumerate() {
                println!("{} {}", format!("{}:", i + 1).cyan(), path.display());
            }
            if !cli.yes && !cli::confirm("Confirm delete?") {
                return Ok(ExitCode::Success);
            }
            let mut failures = 0;
            for path in &cli.paths {
                if let Err(e) = can.permanently_delete(path) {
                    report_item_error(&e);
                    failures += 1;
                }
            }
            Ok(exit_for(failures))
        }

        Mode::Restore => {
            require_paths(&cli)?;
            let mut can = TrashCan::open(trash_dir)?;
            let mut failures = 0;
            for path in &cli.paths {
                match can.restore(path) {
                    Ok(original) => {
                        println!("{} restored", original.display().yellow());
                    }
                    Err(e) => {
                        report_item_error(&e);
                        failures += 1;
                    }
                }
            }
            Ok(exit_for(failures))
        }

        Mode::Trash => {
            require_paths(&cli)?;
            let mut can = TrashCan::open(trash_dir)?;
            let options = TrashOptions {
                force_if_missing: cli.force,
                allow_cross_device_copy: !cli.no_copy,
            };
            let mut failures = 0;
            for path in &cli.paths {
                match can.trash(path, &options) {
                    Ok(TrashOutcome::Trashed {
                        ledger_key,
                        renamed,
                        ..
                    }) => {
                        if renamed {
                            println!(
                                "To avoid a conflict, {} is recorded as {}",
                                path.display().yellow(),
                                ledger_key.display().yellow()
                            );
                        }
                        println!("Trashed {}", ledger_key.display().yellow());
                        println!(
                            "Undo using {}",
                            format!("rustbin --restore \"{}\"", ledger_key.display()).yellow()
                        );
                    }
                    Ok(TrashOutcome::SkippedMissing(path)) => {
                        log::debug!("Skipped missing {}", path.display());
                    }
                    Err(e) => {
                        report_item_error(&e);
                        failures += 1;
                    }
                }
            }
            Ok(exit_for(failures))
        }
    }
}

fn require_paths(cli: &Cli) -> Result<()> {
    if cli.paths.is_empty() {
        anyhow::bail!("no paths given (see --help)");
    }
    Ok(())
}

fn report_item_error(err: &can::TrashError) {
    eprintln!("{} {err}", "error:".red());
}

fn exit_for(failures: usize) -> ExitCode {
    if failures == 0 {
        ExitCode::Success
    } else {
        ExitCode::PartialFailure
    }
}
