//! Ledger module: the persistent record of reversible deletions.
//!
//! The ledger maps each trashed object's original absolute path to its
//! current location inside the trash holding directory. It is the single
//! source of truth for what is in the trash; every trash operation inserts
//! into it and every restore goes through it.
//!
//! # Persistence
//!
//! * **Whole-file**: the ledger is read entirely at process start and
//!   rewritten in full after every mutation (no append log).
//! * **Integrity**: the file is a JSON envelope carrying a SHA-256 checksum
//!   of the serialized ledger; corruption is rejected loudly.
//! * **Atomicity**: rewrites go through a sibling temp file and a rename,
//!   so a crash mid-flush loses at most the in-flight operation.
//! * **Versioning**: the format carries a version number; unknown versions
//!   are rejected rather than migrated.
//!
//! # Architecture
//!
//! * [`data`]: the in-memory map and entry types.
//! * [`io`]: envelope serialization, checksum verification, atomic rewrite.

pub mod data;
pub mod io;

pub use data::{Ledger, LedgerEntry, LEDGER_VERSION};
pub use io::LedgerError;
