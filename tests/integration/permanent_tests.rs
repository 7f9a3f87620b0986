use rustbin::can::{TrashCan, TrashOptions};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_permanent_delete_file_bypasses_trash() {
    let dir = tempdir().unwrap();
    let can = TrashCan::open(dir.path().join("bin")).unwrap();
    let file = dir.path().join("a.txt");
    write_file(&file, b"gone for good");

    can.permanently_delete(&file).unwrap();

    assert!(!file.exists());
    assert!(can.list().is_empty());
    // Nothing was parked in the holding directory.
    assert!(!can.trash_dir().exists());
}

#[test]
fn test_permanent_delete_directory_tree() {
    let dir = tempdir().unwrap();
    let can = TrashCan::open(dir.path().join("bin")).unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir_all(tree.join("a/b/c")).unwrap();
    write_file(&tree.join("a/b/c/leaf.txt"), b"deep");

    can.permanently_delete(&tree).unwrap();
    assert!(!tree.exists());
}

#[cfg(unix)]
#[test]
fn test_permanent_delete_readonly_tree() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let can = TrashCan::open(dir.path().join("bin")).unwrap();

    // Mimic a version-control object store: read-only files inside
    // read-only directories.
    let tree = dir.path().join("repo");
    fs::create_dir_all(tree.join("objects/ab")).unwrap();
    let blob = tree.join("objects/ab/blob");
    write_file(&blob, b"object data");
    fs::set_permissions(&blob, fs::Permissions::from_mode(0o444)).unwrap();
    fs::set_permissions(tree.join("objects/ab"), fs::Permissions::from_mode(0o555)).unwrap();
    fs::set_permissions(tree.join("objects"), fs::Permissions::from_mode(0o555)).unwrap();

    can.permanently_delete(&tree).unwrap();
    assert!(!tree.exists());
}

#[cfg(unix)]
#[test]
fn test_empty_trash_containing_readonly_tree() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let mut can = TrashCan::open(dir.path().join("bin")).unwrap();

    let tree = dir.path().join("hardened");
    fs::create_dir_all(&tree).unwrap();
    let file = tree.join("locked.txt");
    write_file(&file, b"locked");
    fs::set_permissions(&file, fs::Permissions::from_mode(0o444)).unwrap();
    fs::set_permissions(&tree, fs::Permissions::from_mode(0o555)).unwrap();

    can.trash(&tree, &TrashOptions::default()).unwrap();
    can.empty().unwrap();

    assert!(!can.trash_dir().exists());
    assert!(can.list().is_empty());
}
