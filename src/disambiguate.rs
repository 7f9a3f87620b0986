//! Collision disambiguation for trash destinations and ledger keys.
//!
//! When a candidate path conflicts (the caller decides what "conflicts"
//! means: exists on disk, or already a ledger key), a suffix is appended to
//! make it unique. Suffixes escalate through timestamp resolutions and end
//! at random 63-bit integers, so a collision can never silently overwrite a
//! previous deletion.
//!
//! The ladder is an explicit ordered list of strategies, kept free of any
//! filesystem I/O: the conflict test is a caller-supplied predicate, which
//! makes the policy testable in isolation.

use chrono::Local;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One rung of the escalation ladder: produces a suffix to append to the
/// original candidate.
type SuffixStrategy = Box<dyn Fn() -> String>;

/// The ordered ladder of suffix strategies, finest-grained last.
///
/// Every rung is evaluated against the *original* candidate, never against a
/// previous attempt, so suffixes do not stack.
fn escalation_ladder() -> Vec<SuffixStrategy> {
    vec![
        // The unmodified candidate is the common case.
        Box::new(String::new),
        // One-second resolution, human readable.
        Box::new(|| Local::now().format(".%Y%m%d-%H%M%S").to_string()),
        // Same second: escalate to milliseconds.
        Box::new(|| Local::now().format(".%Y%m%d-%H%M%S%.3f").to_string()),
        // Same millisecond: microseconds.
        Box::new(|| Local::now().format(".%Y%m%d-%H%M%S%.6f").to_string()),
        // Same microsecond: nanoseconds.
        Box::new(|| Local::now().format(".%Y%m%d-%H%M%S%.9f").to_string()),
    ]
}

/// Append `suffix` to the final component of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        return path.to_path_buf();
    }
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Produce a path derived from `candidate` for which `conflicts` returns
/// false.
///
/// Strategies are tried in ladder order; once timestamps are exhausted,
/// random 63-bit integer suffixes are drawn until one is free. The predicate
/// is re-tested for every attempt, and every attempt suffixes the original
/// candidate.
pub fn disambiguate<F>(candidate: &Path, mut conflicts: F) -> PathBuf
where
    F: FnMut(&Path) -> bool,
{
    for strategy in escalation_ladder() {
        let attempt = with_suffix(candidate, &strategy());
        if !conflicts(&attempt) {
            if attempt != candidate {
                log::debug!(
                    "Conflict on {}: renamed to {}",
                    candidate.display(),
                    attempt.display()
                );
            }
            return attempt;
        }
    }

    // Nanosecond timestamps still collide: fall back to randomness. The
    // integers are not security-relevant, they only need to be plentiful.
    loop {
        let n: u64 = rand::random::<u64>() >> 1;
        let attempt = with_suffix(candidate, &format!(".{n}"));
        if !conflicts(&attempt) {
            log::debug!(
                "Conflict on {}: renamed to {}",
                candidate.display(),
                attempt.display()
            );
            return attempt;
        }
    }
}
