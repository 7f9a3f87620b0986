//! Data structures for the trash ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current version of the ledger file format.
pub const LEDGER_VERSION: u32 = 1;

/// One reversible deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Where the object currently lives inside the trash directory.
    pub trashed_path: PathBuf,
    /// When it was trashed.
    pub trashed_at: DateTime<Utc>,
}

/// The persistent mapping from original path to trashed location.
///
/// Keys are absolute, canonicalized original paths. A second trash of the
/// same original path gets a new disambiguated key; entries are never
/// silently overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Format version.
    pub version: u32,
    /// Original path -> entry.
    entries: BTreeMap<PathBuf, LedgerEntry>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an empty ledger at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Record that `original` now lives at `trashed_path`.
    ///
    /// Callers must disambiguate `original` against [`Self::contains`]
    /// first; inserting an existing key would overwrite a prior deletion.
    pub fn insert(&mut self, original: PathBuf, trashed_path: PathBuf) {
        let previous = self.entries.insert(
            original,
            LedgerEntry {
                trashed_path,
                trashed_at: Utc::now(),
            },
        );
        debug_assert!(previous.is_none(), "ledger key collision");
    }

    /// Remove and return the entry for `original`.
    pub fn remove(&mut self, original: &Path) -> Option<LedgerEntry> {
        self.entries.remove(original)
    }

    /// Look up the entry for `original`.
    #[must_use]
    pub fn get(&self, original: &Path) -> Option<&LedgerEntry> {
        self.entries.get(original)
    }

    /// Whether `original` is a ledger key.
    #[must_use]
    pub fn contains(&self, original: &Path) -> bool {
        self.entries.contains_key(original)
    }

    /// One-shot snapshot of the original paths currently in the trash,
    /// in sorted order.
    #[must_use]
    pub fn original_paths(&self) -> Vec<PathBuf> {
        self.entries.keys().cloned().collect()
    }

    /// Iterate over (original path, entry) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &LedgerEntry)> {
        self.entries.iter()
    }

    /// Number of trashed objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trash is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries (used after the trash directory is emptied).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
