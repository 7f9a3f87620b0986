//! Command-line interface definitions for rustbin.
//!
//! This module defines all CLI arguments and options using the clap derive
//! API. The interface is flag-driven in the tradition of `rm`: the default
//! action trashes the given paths, and mutually exclusive mode flags switch
//! to restore/list/empty/permanent/directory behavior.
//!
//! # Example
//!
//! ```bash
//! # Move files to the trash
//! rustbin notes.txt build/
//!
//! # Restore a file to where it came from
//! rustbin --restore notes.txt
//!
//! # See what is in the trash
//! rustbin --list
//!
//! # Delete permanently, skipping the trash
//! rustbin --permanent secrets.txt
//! ```

use clap::{ArgGroup, Parser};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Recoverable rm: a CLI trash can with a persistent undo ledger.
///
/// rustbin moves files into a holding directory instead of deleting them
/// and records where they came from, so any deletion can be undone until
/// the trash is emptied.
#[derive(Debug, Parser)]
#[command(name = "rustbin")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["restore", "list", "empty", "permanent", "directory"])
))]
pub struct Cli {
    /// Paths to trash (or to restore / permanently delete, with a mode flag)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Restore the given paths from the trash
    #[arg(short = 'u', long)]
    pub restore: bool,

    /// List the original paths of everything in the trash
    #[arg(short, long)]
    pub list: bool,

    /// Permanently delete everything in the trash
    #[arg(long)]
    pub empty: bool,

    /// Permanently delete the given paths, bypassing the trash
    ///
    /// Warning: files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Print the trash directory path
    #[arg(short, long)]
    pub directory: bool,

    /// Use DIR as the trash directory
    #[arg(short = 't', long, value_name = "DIR", env = "RUSTBIN_TRASH_DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Ignore nonexistent paths instead of reporting them
    #[arg(short, long)]
    pub force: bool,

    /// Disable the copy fallback for paths on another filesystem
    ///
    /// With this flag, trashing a file that cannot be renamed into the
    /// trash directory fails instead of being copied and deleted.
    #[arg(long)]
    pub no_copy: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Emit errors as structured JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// What one invocation is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Move paths into the trash (the default).
    Trash,
    /// Restore paths from the trash.
    Restore,
    /// List trashed original paths.
    List,
    /// Permanently empty the whole trash.
    Empty,
    /// Permanently delete the given paths.
    Permanent,
    /// Print the trash directory.
    Directory,
}

impl Cli {
    /// Resolve the mode flags (clap guarantees at most one is set).
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.restore {
            Mode::Restore
        } else if self.list {
            Mode::List
        } else if self.empty {
            Mode::Empty
        } else if self.permanent {
            Mode::Permanent
        } else if self.directory {
            Mode::Directory
        } else {
            Mode::Trash
        }
    }
}

/// Blocking y/n confirmation on stdin. Empty input and EOF count as yes,
/// matching the historic behavior of the tool this replaces.
pub fn confirm(prompt: &str) -> bool {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{prompt} (Y/n) > ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return true,
            Ok(_) => match line.trim() {
                "" | "y" | "Y" | "yes" | "Yes" | "YES" => return true,
                "n" | "N" | "no" | "No" | "NO" => return false,
                _ => continue,
            },
        }
    }
}
