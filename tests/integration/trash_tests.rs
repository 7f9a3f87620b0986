use rustbin::can::{TrashCan, TrashOptions, TrashOutcome};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn trashed(outcome: TrashOutcome) -> (PathBuf, PathBuf, bool) {
    match outcome {
        TrashOutcome::Trashed {
            ledger_key,
            trashed_path,
            renamed,
        } => (ledger_key, trashed_path, renamed),
        TrashOutcome::SkippedMissing(p) => panic!("unexpected skip of {}", p.display()),
    }
}

#[test]
fn test_trash_restore_round_trip() {
    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();
    let file = dir.path().join("a.txt");
    write_file(&file, b"round trip payload");

    let (key, trashed_path, renamed) =
        trashed(can.trash(&file, &TrashOptions::default()).unwrap());

    assert!(!file.exists());
    assert!(trashed_path.exists());
    assert!(!renamed);
    assert_eq!(trashed_path.file_name().unwrap(), "a.txt");
    assert_eq!(can.list(), vec![key.clone()]);

    let restored_to = can.restore(&key).unwrap();

    assert_eq!(restored_to, key);
    assert_eq!(fs::read(&restored_to).unwrap(), b"round trip payload");
    assert!(can.list().is_empty());
    assert!(!trashed_path.exists());
}

#[test]
fn test_trash_restore_directory_tree() {
    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();
    let tree = dir.path().join("project");
    fs::create_dir_all(tree.join("src/deep")).unwrap();
    write_file(&tree.join("src/deep/code.rs"), b"fn main() {}");
    write_file(&tree.join("readme.md"), b"# hi");

    let (key, _, _) = trashed(can.trash(&tree, &TrashOptions::default()).unwrap());
    assert!(!tree.exists());

    can.restore(&key).unwrap();

    assert_eq!(fs::read(tree.join("src/deep/code.rs")).unwrap(), b"fn main() {}");
    assert_eq!(fs::read(tree.join("readme.md")).unwrap(), b"# hi");
}

#[test]
fn test_same_basename_never_overwrites() {
    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();

    let first_dir = dir.path().join("one");
    let second_dir = dir.path().join("two");
    fs::create_dir_all(&first_dir).unwrap();
    fs::create_dir_all(&second_dir).unwrap();
    write_file(&first_dir.join("x.txt"), b"first");
    write_file(&second_dir.join("x.txt"), b"second");

    let (key1, trashed1, _) = trashed(
        can.trash(&first_dir.join("x.txt"), &TrashOptions::default())
            .unwrap(),
    );
    let (key2, trashed2, renamed2) = trashed(
        can.trash(&second_dir.join("x.txt"), &TrashOptions::default())
            .unwrap(),
    );

    // Distinct holding-dir names, both present on disk.
    assert_ne!(trashed1, trashed2);
    assert!(renamed2);
    assert_eq!(fs::read(&trashed1).unwrap(), b"first");
    assert_eq!(fs::read(&trashed2).unwrap(), b"second");

    // Both independently restorable.
    can.restore(&key1).unwrap();
    can.restore(&key2).unwrap();
    assert_eq!(fs::read(first_dir.join("x.txt")).unwrap(), b"first");
    assert_eq!(fs::read(second_dir.join("x.txt")).unwrap(), b"second");
    assert!(can.list().is_empty());
}

#[test]
fn test_double_trash_of_same_path_gets_distinct_keys() {
    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();
    let file = dir.path().join("a.txt");

    write_file(&file, b"generation 1");
    let (key1, _, _) = trashed(can.trash(&file, &TrashOptions::default()).unwrap());

    // The path reappears and is trashed again.
    write_file(&file, b"generation 2");
    let (key2, _, renamed2) = trashed(can.trash(&file, &TrashOptions::default()).unwrap());

    assert_ne!(key1, key2);
    assert!(renamed2);
    assert_eq!(can.list().len(), 2);

    // The first entry restores to the bare path, the second to its
    // disambiguated key; neither clobbers the other.
    can.restore(&key1).unwrap();
    assert_eq!(fs::read(&file).unwrap(), b"generation 1");

    can.restore(&key2).unwrap();
    assert_eq!(fs::read(&key2).unwrap(), b"generation 2");
    assert!(can.list().is_empty());
}

#[test]
fn test_restored_path_leaves_the_listing() {
    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();
    let keep = dir.path().join("keep.txt");
    let back = dir.path().join("back.txt");
    write_file(&keep, b"keep");
    write_file(&back, b"back");

    let (keep_key, _, _) = trashed(can.trash(&keep, &TrashOptions::default()).unwrap());
    let (back_key, _, _) = trashed(can.trash(&back, &TrashOptions::default()).unwrap());
    assert_eq!(can.list().len(), 2);

    can.restore(&back_key).unwrap();

    let listing = can.list();
    assert_eq!(listing, vec![keep_key]);
    assert!(!listing.contains(&back_key));
}

#[cfg(unix)]
#[test]
fn test_failed_relocation_leaves_ledger_untouched() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();

    let locked_dir = dir.path().join("locked");
    fs::create_dir(&locked_dir).unwrap();
    let file = locked_dir.join("a.txt");
    write_file(&file, b"unreachable");

    // A read-only parent blocks unlinking the child, so the rename into
    // the trash directory fails.
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not bind root; nothing to test there.
    if fs::write(locked_dir.join("probe"), b"").is_ok() {
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = can.trash(&file, &TrashOptions::default());

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(result.is_err());
    assert!(can.list().is_empty());
    assert!(file.exists());
}

#[test]
fn test_holding_dir_contains_only_trashed_objects_and_ledger() {
    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();
    let file = dir.path().join("a.txt");
    write_file(&file, b"x");

    can.trash(&file, &TrashOptions::default()).unwrap();

    let mut names: Vec<String> = fs::read_dir(can.trash_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.txt".to_string(), "ledger.json".to_string()]);
}
