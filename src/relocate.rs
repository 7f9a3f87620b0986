//! File relocation engine.
//!
//! # Overview
//!
//! This module moves a filesystem object (file, directory, or symlink)
//! between two paths:
//! - Atomic rename when source and destination share a filesystem
//! - Recursive copy + delete fallback when the rename fails with the
//!   cross-device condition (and the caller allows it)
//! - Read-only-resilient recursive deletion, used by the fallback and by
//!   permanent deletion
//!
//! # Safety
//!
//! Any rename failure other than cross-device is surfaced as-is with no
//! fallback. If the fallback copy fails midway, the source tree is left in
//! place; the partial destination is not guaranteed clean, which is
//! acceptable because callers only record a trash ledger entry after
//! relocation succeeds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Error type for relocation operations.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// Source path was not found.
    #[error("source not found: {0}")]
    SourceMissing(PathBuf),

    /// Destination path is already occupied.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Source and destination are on different filesystems and the copy
    /// fallback is disabled.
    #[error("{src} and {dst} are on different filesystems (copy fallback disabled)")]
    CrossDeviceDisabled { src: PathBuf, dst: PathBuf },

    /// The cross-device copy fallback failed; the source is left in place.
    #[error("cross-device copy from {src} to {dst} failed: {source}")]
    CopyFallbackFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocateError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Capability query: did this rename fail because source and destination
/// live on different filesystems?
///
/// Detection is by raw OS error code so the fallback decision stays portable
/// at the call site.
#[must_use]
pub fn is_cross_device(err: &io::Error) -> bool {
    // EXDEV on Unix, ERROR_NOT_SAME_DEVICE on Windows.
    #[cfg(unix)]
    const CROSS_DEVICE_CODE: i32 = 18;
    #[cfg(windows)]
    const CROSS_DEVICE_CODE: i32 = 17;
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE_CODE: i32 = i32::MIN;

    err.raw_os_error() == Some(CROSS_DEVICE_CODE)
}

/// Move `src` to `dst`, falling back to copy + delete across filesystem
/// boundaries when `allow_copy` is true.
///
/// # Errors
///
/// - `SourceMissing` if `src` does not exist (symlink-aware: a broken
///   symlink counts as existing)
/// - `DestinationExists` if `dst` is already occupied
/// - `CrossDeviceDisabled` if the rename hit the cross-device condition and
///   `allow_copy` is false
/// - `CopyFallbackFailed` if the fallback copy died midway
/// - `Io` for any other failure, surfaced without retry
pub fn relocate(src: &Path, dst: &Path, allow_copy: bool) -> Result<(), RelocateError> {
    relocate_with(src, dst, allow_copy, |from, to| fs::rename(from, to))
}

/// Relocation with an injectable rename primitive.
///
/// The indirection exists so the cross-device decision logic can be tested
/// without an actual filesystem boundary.
fn relocate_with<F>(src: &Path, dst: &Path, allow_copy: bool, rename: F) -> Result<(), RelocateError>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    if let Err(e) = fs::symlink_metadata(src) {
        return Err(match e.kind() {
            io::ErrorKind::NotFound => RelocateError::SourceMissing(src.to_path_buf()),
            _ => RelocateError::io(src, e),
        });
    }
    if fs::symlink_metadata(dst).is_ok() {
        return Err(RelocateError::DestinationExists(dst.to_path_buf()));
    }

    match rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            if !allow_copy {
                return Err(RelocateError::CrossDeviceDisabled {
                    src: src.to_path_buf(),
                    dst: dst.to_path_buf(),
                });
            }
            log::debug!(
                "Rename {} -> {} crossed a filesystem boundary, copying instead",
                src.display(),
                dst.display()
            );
            copy_tree(src, dst).map_err(|e| RelocateError::CopyFallbackFailed {
                src: src.to_path_buf(),
                dst: dst.to_path_buf(),
                source: e,
            })?;
            remove_tree(src)
        }
        Err(e) => Err(RelocateError::io(src, e)),
    }
}

/// Recursively copy the tree rooted at `src` to `dst`.
///
/// Symlinks are re-created with their original targets, never followed, so
/// broken links survive the copy intact.
fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(src)?;

    if meta.is_dir() {
        for entry in WalkDir::new(src).follow_links(false) {
            let entry = entry.map_err(io::Error::from)?;
            let rel = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let target = dst.join(rel);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    } else if meta.file_type().is_symlink() {
        copy_symlink(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let _ = (src, dst);
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlink copy is not supported on this platform",
    ))
}

/// Recursively and irrecoverably remove `path`.
///
/// If a plain delete fails, write permission is granted on the whole tree
/// and the delete is retried once. Read-only trees (version-control object
/// stores, hardened checkouts) are the usual reason for the first failure.
///
/// # Errors
///
/// - `SourceMissing` if `path` does not exist
/// - `Io` if the retried delete also fails
pub fn remove_tree(path: &Path) -> Result<(), RelocateError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RelocateError::SourceMissing(path.to_path_buf()))
        }
        Err(e) => return Err(RelocateError::io(path, e)),
    };

    let attempt = || {
        if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    };

    match attempt() {
        Ok(()) => Ok(()),
        Err(first) => {
            log::debug!(
                "Delete of {} failed ({first}), granting write permission and retrying",
                path.display()
            );
            grant_write_recursive(path);
            attempt().map_err(|e| RelocateError::io(path, e))
        }
    }
}

/// Best-effort sweep that makes `path` and everything under it writable.
/// Individual failures are ignored; the retried delete reports the final
/// verdict.
fn grant_write_recursive(path: &Path) {
    for entry in WalkDir::new(path).follow_links(false) {
        let Ok(entry) = entry else { continue };
        let Ok(meta) = entry.metadata() else { continue };
        // chmod would follow a symlink and touch something outside the tree.
        if meta.file_type().is_symlink() {
            continue;
        }
        grant_write(entry.path(), &meta);
    }
}

#[cfg(unix)]
fn grant_write(path: &Path, meta: &fs::Metadata) {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    // Directories also need execute so their children stay reachable.
    let wanted = if meta.is_dir() {
        mode | 0o700
    } else {
        mode | 0o200
    };
    if wanted != mode {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(wanted));
    }
}

#[cfg(not(unix))]
fn grant_write(path: &Path, meta: &fs::Metadata) {
    let mut perms = meta.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        let _ = fs::set_permissions(path, perms);
    }
}
