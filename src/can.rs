//! The trash can: orchestrates relocation, disambiguation, and the ledger.
//!
//! # Overview
//!
//! [`TrashCan`] owns the holding directory and the in-memory ledger for the
//! lifetime of the process. Every operation is synchronous and per-path:
//! one trash or restore either completes (object moved, ledger flushed) or
//! fails with the ledger left unmodified for that entry. There is no
//! cross-process locking; two concurrent invocations against the same trash
//! directory can race (known limitation).
//!
//! # Consistency
//!
//! The ledger flush is always the last step. If the flush fails after a
//! successful move, the error says so explicitly: the filesystem is then
//! ahead of the ledger and physical truth wins.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::LEDGER_FILE_NAME;
use crate::disambiguate::disambiguate;
use crate::ledger::{Ledger, LedgerError};
use crate::relocate::{relocate, remove_tree, RelocateError};

/// Error type for trash can operations.
#[derive(Debug, Error)]
pub enum TrashError {
    /// The requested path does not exist.
    #[error("{0} does not exist")]
    NotFound(PathBuf),

    /// The path has no base name to file it under (e.g. a filesystem root).
    #[error("{0} cannot be trashed")]
    Untrashable(PathBuf),

    /// The path already lives inside the trash directory.
    #[error("{0} is already in the trash")]
    AlreadyInTrash(PathBuf),

    /// Restore was asked for a path the ledger knows nothing about.
    #[error("{0} is not in the trash or is missing restore data")]
    NotInTrash(PathBuf),

    /// Moving the object failed; the ledger was not touched.
    #[error(transparent)]
    Relocate(#[from] RelocateError),

    /// Reading or writing the ledger file failed before any object moved.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The object moved but the ledger flush failed: the ledger is now out
    /// of sync with the filesystem and must be reconciled by hand.
    #[error("{path} was moved but the trash ledger could not be saved; the ledger is out of sync: {source}")]
    PersistAfterMove {
        path: PathBuf,
        #[source]
        source: LedgerError,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Options for a single trash operation.
#[derive(Debug, Clone)]
pub struct TrashOptions {
    /// Silently skip paths that do not exist instead of erroring.
    pub force_if_missing: bool,
    /// Allow the copy + delete fallback when source and trash directory are
    /// on different filesystems.
    pub allow_cross_device_copy: bool,
}

impl Default for TrashOptions {
    fn default() -> Self {
        Self {
            force_if_missing: false,
            allow_cross_device_copy: true,
        }
    }
}

/// Result of a single trash operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashOutcome {
    /// The object was moved into the trash.
    Trashed {
        /// Ledger key to hand to `restore` (the canonicalized original
        /// path, possibly suffixed to disambiguate).
        ledger_key: PathBuf,
        /// Where the object now lives.
        trashed_path: PathBuf,
        /// Whether either the key or the holding-dir name needed a
        /// disambiguating suffix.
        renamed: bool,
    },
    /// The path was missing and `force_if_missing` was set.
    SkippedMissing(PathBuf),
}

/// A trash holding directory plus its ledger, owned for the process
/// lifetime.
#[derive(Debug)]
pub struct TrashCan {
    trash_dir: PathBuf,
    ledger_path: PathBuf,
    ledger: Ledger,
}

impl TrashCan {
    /// Open the trash can rooted at `trash_dir`, loading the ledger if one
    /// exists. The directory itself is created lazily on first trash.
    pub fn open(trash_dir: PathBuf) -> Result<Self, TrashError> {
        // Resolve symlinked ancestors so later prefix checks compare like
        // with like; a not-yet-created directory gets the same relaxed
        // normalization its future contents will.
        let trash_dir = match trash_dir.canonicalize() {
            Ok(resolved) => resolved,
            Err(_) => absolutize(&trash_dir)?,
        };
        let ledger_path = trash_dir.join(LEDGER_FILE_NAME);
        let ledger = Ledger::load_or_default(&ledger_path)?;
        log::debug!(
            "Opened trash can at {} with {} entries",
            trash_dir.display(),
            ledger.len()
        );
        Ok(Self {
            trash_dir,
            ledger_path,
            ledger,
        })
    }

    /// The holding directory this can writes to.
    #[must_use]
    pub fn trash_dir(&self) -> &Path {
        &self.trash_dir
    }

    /// Move `path` into the trash and record it in the ledger.
    ///
    /// # Errors
    ///
    /// - `NotFound` unless `force_if_missing` is set
    /// - `AlreadyInTrash` for paths inside the holding directory
    /// - `Untrashable` for paths without a base name
    /// - Relocation errors, surfaced before the ledger is touched
    /// - `PersistAfterMove` if the final ledger flush fails
    pub fn trash(
        &mut self,
        path: &Path,
        options: &TrashOptions,
    ) -> Result<TrashOutcome, TrashError> {
        let original = absolutize(path)?;

        if fs::symlink_metadata(&original).is_err() {
            if options.force_if_missing {
                log::debug!("Skipping missing path {}", original.display());
                return Ok(TrashOutcome::SkippedMissing(original));
            }
            return Err(TrashError::NotFound(original));
        }
        if original.starts_with(&self.trash_dir) {
            return Err(TrashError::AlreadyInTrash(original));
        }

        self.ensure_trash_dir()?;

        let base = original
            .file_name()
            .ok_or_else(|| TrashError::Untrashable(original.clone()))?;

        // Two independent conflict domains: the holding directory on disk,
        // and the set of ledger keys. The ledger file's own name is
        // reserved even before the first flush creates it.
        let candidate = self.trash_dir.join(base);
        let ledger_path = self.ledger_path.clone();
        let destination = disambiguate(&candidate, |p| {
            p == ledger_path.as_path() || fs::symlink_metadata(p).is_ok()
        });
        let ledger = &self.ledger;
        let ledger_key = disambiguate(&original, |p| ledger.contains(p));

        relocate(&original, &destination, options.allow_cross_device_copy)?;

        self.ledger.insert(ledger_key.clone(), destination.clone());
        self.ledger
            .save(&self.ledger_path)
            .map_err(|source| TrashError::PersistAfterMove {
                path: destination.clone(),
                source,
            })?;

        let renamed = ledger_key != original || destination != candidate;
        log::info!(
            "Trashed {} -> {}",
            ledger_key.display(),
            destination.display()
        );
        Ok(TrashOutcome::Trashed {
            ledger_key,
            trashed_path: destination,
            renamed,
        })
    }

    /// Move a trashed object back to its original path and drop its ledger
    /// entry.
    ///
    /// The entry is only removed after the physical move succeeds; a failed
    /// restore leaves the ledger unchanged.
    pub fn restore(&mut self, path: &Path) -> Result<PathBuf, TrashError> {
        let original = absolutize(path)?;

        let entry = self
            .ledger
            .get(&original)
            .ok_or_else(|| TrashError::NotInTrash(original.clone()))?;
        let trashed_path = entry.trashed_path.clone();

        relocate(&trashed_path, &original, true)?;

        self.ledger.remove(&original);
        self.ledger
            .save(&self.ledger_path)
            .map_err(|source| TrashError::PersistAfterMove {
                path: original.clone(),
                source,
            })?;

        log::info!(
            "Restored {} <- {}",
            original.display(),
            trashed_path.display()
        );
        Ok(original)
    }

    /// One-shot snapshot of the original paths currently in the trash.
    #[must_use]
    pub fn list(&self) -> Vec<PathBuf> {
        self.ledger.original_paths()
    }

    /// Permanently delete the whole holding directory, ledger storage
    /// included. Irreversible.
    pub fn empty(&mut self) -> Result<(), TrashError> {
        if fs::symlink_metadata(&self.trash_dir).is_ok() {
            remove_tree(&self.trash_dir)?;
        }
        self.ledger.clear();
        log::info!("Emptied trash at {}", self.trash_dir.display());
        Ok(())
    }

    /// Permanently delete `path`, bypassing the trash. Irreversible.
    pub fn permanently_delete(&self, path: &Path) -> Result<(), TrashError> {
        let target = absolutize(path)?;
        match remove_tree(&target) {
            Ok(()) => {
                log::info!("Permanently deleted {}", target.display());
                Ok(())
            }
            Err(RelocateError::SourceMissing(p)) => Err(TrashError::NotFound(p)),
            Err(e) => Err(e.into()),
        }
    }

    /// Make sure the holding directory exists. A non-directory squatting on
    /// the path is destroyed and replaced (self-healing).
    fn ensure_trash_dir(&self) -> Result<(), TrashError> {
        match fs::symlink_metadata(&self.trash_dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => {
                log::warn!(
                    "{} exists but is not a directory, recreating it",
                    self.trash_dir.display()
                );
                remove_tree(&self.trash_dir)?;
                fs::create_dir_all(&self.trash_dir).map_err(|e| TrashError::Io {
                    path: self.trash_dir.clone(),
                    source: e,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.trash_dir).map_err(|e| TrashError::Io {
                    path: self.trash_dir.clone(),
                    source: e,
                })
            }
            Err(e) => Err(TrashError::Io {
                path: self.trash_dir.clone(),
                source: e,
            }),
        }
    }
}

/// Turn `path` into an absolute, normalized form without resolving the
/// final component.
///
/// The parent is canonicalized (so `.`/`..` and symlinked directories
/// normalize away) but the leaf is kept as-is: trashing a symlink must move
/// the link itself, never its target, and a broken link must still be
/// addressable.
fn absolutize(path: &Path) -> Result<PathBuf, TrashError> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map_err(|e| TrashError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .join(path)
    };

    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            let parent = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());
            Ok(parent.join(name))
        }
        _ => Ok(abs),
    }
}
