use rustbin::can::{TrashCan, TrashOptions, TrashOutcome};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn key_of(outcome: TrashOutcome) -> PathBuf {
    match outcome {
        TrashOutcome::Trashed { ledger_key, .. } => ledger_key,
        TrashOutcome::SkippedMissing(p) => panic!("unexpected skip of {}", p.display()),
    }
}

#[test]
fn test_ledger_survives_process_restart() {
    let dir = tempdir().unwrap();
    let trash_dir = dir.path().join("bin");
    let file = dir.path().join("a.txt");
    write_file(&file, b"persistent");

    let key = {
        let mut can = TrashCan::open(trash_dir.clone()).unwrap();
        key_of(can.trash(&file, &TrashOptions::default()).unwrap())
    };

    // A fresh instance models a new process invocation.
    let mut can = TrashCan::open(trash_dir).unwrap();
    assert_eq!(can.list(), vec![key.clone()]);

    can.restore(&key).unwrap();
    assert_eq!(fs::read(&file).unwrap(), b"persistent");
}

#[test]
fn test_every_mutation_is_flushed() {
    let dir = tempdir().unwrap();
    let trash_dir = dir.path().join("bin");
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    write_file(&a, b"a");
    write_file(&b, b"b");

    let mut can = TrashCan::open(trash_dir.clone()).unwrap();
    can.trash(&a, &TrashOptions::default()).unwrap();

    // The first trash is already on disk even though the process (this
    // instance) is still alive and about to do more work.
    let snapshot = TrashCan::open(trash_dir.clone()).unwrap();
    assert_eq!(snapshot.list().len(), 1);

    can.trash(&b, &TrashOptions::default()).unwrap();
    let snapshot = TrashCan::open(trash_dir).unwrap();
    assert_eq!(snapshot.list().len(), 2);
}

#[test]
fn test_empty_discards_ledger_storage() {
    let dir = tempdir().unwrap();
    let trash_dir = dir.path().join("bin");
    let file = dir.path().join("a.txt");
    write_file(&file, b"x");

    let mut can = TrashCan::open(trash_dir.clone()).unwrap();
    can.trash(&file, &TrashOptions::default()).unwrap();
    assert!(trash_dir.join("ledger.json").exists());

    can.empty().unwrap();

    // The whole holding directory is gone, ledger file included.
    assert!(!trash_dir.exists());
    let can = TrashCan::open(trash_dir).unwrap();
    assert!(can.list().is_empty());
}

#[test]
fn test_corrupt_ledger_is_rejected_loudly() {
    let dir = tempdir().unwrap();
    let trash_dir = dir.path().join("bin");
    fs::create_dir_all(&trash_dir).unwrap();
    fs::write(trash_dir.join("ledger.json"), "not a ledger").unwrap();

    let result = TrashCan::open(trash_dir);
    assert!(result.is_err());
}

#[test]
fn test_trashing_resumes_after_manual_ledger_deletion() {
    let dir = tempdir().unwrap();
    let trash_dir = dir.path().join("bin");
    let a = dir.path().join("a.txt");
    write_file(&a, b"first life");

    {
        let mut can = TrashCan::open(trash_dir.clone()).unwrap();
        can.trash(&a, &TrashOptions::default()).unwrap();
    }

    // Someone deletes the ledger by hand; the trashed file stays behind.
    fs::remove_file(trash_dir.join("ledger.json")).unwrap();

    let mut can = TrashCan::open(trash_dir.clone()).unwrap();
    assert!(can.list().is_empty());

    // Trashing a new file with the same basename must not clobber the
    // orphaned copy in the holding directory.
    write_file(&a, b"second life");
    let outcome = can.trash(&a, &TrashOptions::default()).unwrap();
    let TrashOutcome::Trashed {
        trashed_path,
        renamed,
        ..
    } = outcome
    else {
        panic!("expected Trashed outcome");
    };

    assert!(renamed);
    assert_eq!(fs::read(trash_dir.join("a.txt")).unwrap(), b"first life");
    assert_eq!(fs::read(&trashed_path).unwrap(), b"second life");
}
