//! I/O operations for the trash ledger.

use crate::ledger::data::{Ledger, LEDGER_VERSION};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for ledger persistence.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file could not be read or written.
    #[error("I/O error for ledger file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The ledger file is unparseable or failed its integrity check.
    /// Prior formats of this tool's ledger are treated the same way; there
    /// is no cross-format migration.
    #[error("ledger file {path} is corrupt: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    /// The ledger file has a format version this build does not understand.
    #[error("unsupported ledger version {found} in {path} (current version is {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Serialization failure while flushing.
    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LedgerError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn corrupt(path: &Path, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            detail: detail.into(),
        }
    }
}

/// Envelope for ledger files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerEnvelope {
    /// SHA-256 checksum of the compact-serialized ledger.
    checksum: String,
    /// The actual ledger data.
    ledger: Ledger,
}

fn checksum_of(serialized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Ledger {
    /// Serialize the ledger to a JSON envelope string with an integrity
    /// checksum.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        // Compact serialization is what gets hashed; the envelope itself is
        // pretty-printed for readability.
        let ledger_json = serde_json::to_string(self)?;
        let envelope = LedgerEnvelope {
            checksum: checksum_of(&ledger_json),
            ledger: self.clone(),
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Flush the whole ledger to `path`.
    ///
    /// The write goes to a sibling temp file which is then renamed over the
    /// target, so an interrupted flush leaves the previous ledger intact.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = self.to_json()?;

        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json.as_bytes()).map_err(|e| LedgerError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| LedgerError::io(path, e))?;
        log::trace!("Ledger flushed to {} ({} entries)", path.display(), self.len());
        Ok(())
    }

    /// Load a ledger from `path`, verifying checksum and version.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let content = fs::read_to_string(path).map_err(|e| LedgerError::io(path, e))?;

        let envelope: LedgerEnvelope = serde_json::from_str(&content)
            .map_err(|e| LedgerError::corrupt(path, format!("unparseable envelope: {e}")))?;

        // Re-serialize with the same settings as to_json (compact) to
        // verify the checksum.
        let ledger_json = serde_json::to_string(&envelope.ledger)?;
        if checksum_of(&ledger_json) != envelope.checksum {
            return Err(LedgerError::corrupt(path, "checksum mismatch"));
        }

        let ledger = envelope.ledger;
        if ledger.version != LEDGER_VERSION {
            return Err(LedgerError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: ledger.version,
                expected: LEDGER_VERSION,
            });
        }

        // The trashed copies are supposed to exist as long as their entries
        // do; a missing one means someone reached into the trash directory
        // by hand.
        for (original, entry) in ledger.iter() {
            if fs::symlink_metadata(&entry.trashed_path).is_err() {
                log::warn!(
                    "Trashed copy of {} is missing from {}",
                    original.display(),
                    entry.trashed_path.display()
                );
            }
        }

        Ok(ledger)
    }

    /// Load the ledger at `path`, treating a missing file as an empty
    /// ledger (created lazily on first use). Every other failure is
    /// surfaced: a corrupt ledger must never be silently replaced.
    pub fn load_or_default(path: &Path) -> Result<Self, LedgerError> {
        match Self::load(path) {
            Ok(ledger) => Ok(ledger),
            Err(LedgerError::Io { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }
}
