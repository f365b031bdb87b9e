use asset_tidy::actions::{
    archive_file, consolidate, ConsolidateError, ConsolidateOptions, RemovalAction,
};
use asset_tidy::duplicates::scan;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_archive_with_existing_name() {
    let assets = tempdir().unwrap();
    let archive = tempdir().unwrap();
    write(assets.path(), "a.txt", b"hello");
    let copy = write(assets.path(), "a_copy.txt", b"hello");
    write(archive.path(), "a_copy.txt", b"from an earlier run");

    let report = scan(assets.path(), true).unwrap();
    let options = ConsolidateOptions::default()
        .with_removal(RemovalAction::Archive(archive.path().to_path_buf()));
    let result = consolidate(&report.groups, &options).unwrap();

    assert_eq!(result.removed_count, 1);
    assert!(!copy.exists());
    assert_eq!(
        fs::read(archive.path().join("a_copy_1.txt")).unwrap(),
        b"hello"
    );
    assert_eq!(
        fs::read(archive.path().join("a_copy.txt")).unwrap(),
        b"from an earlier run"
    );
}

#[test]
fn test_archive_same_name_from_several_directories() {
    let assets = tempdir().unwrap();
    let archive = tempdir().unwrap();
    write(assets.path(), "a/icon.svg", b"<svg/>");
    write(assets.path(), "b/icon.svg", b"<svg/>");
    write(assets.path(), "c/icon.svg", b"<svg/>");
    write(assets.path(), "d/icon.svg", b"<svg/>");

    let report = scan(assets.path(), true).unwrap();
    let options = ConsolidateOptions::default()
        .with_removal(RemovalAction::Archive(archive.path().to_path_buf()));
    let result = consolidate(&report.groups, &options).unwrap();

    assert_eq!(result.removed_count, 3);
    assert!(assets.path().join("a/icon.svg").exists());
    assert!(archive.path().join("icon.svg").exists());
    assert!(archive.path().join("icon_1.svg").exists());
    assert!(archive.path().join("icon_2.svg").exists());
    assert!(!archive.path().join("icon_3.svg").exists());
}

#[test]
fn test_archive_fills_gaps() {
    let src = tempdir().unwrap();
    let archive = tempdir().unwrap();
    write(archive.path(), "photo.jpg", b"0");
    write(archive.path(), "photo_2.jpg", b"2");
    let path = write(src.path(), "photo.jpg", b"new");

    let dest = archive_file(&path, archive.path()).unwrap();

    assert_eq!(dest, archive.path().join("photo_1.jpg"));
}

#[test]
fn test_archive_dir_created_when_missing() {
    let assets = tempdir().unwrap();
    write(assets.path(), "a.txt", b"x");
    write(assets.path(), "b.txt", b"x");
    let archive = assets.path().join("nested/archive");

    let report = scan(assets.path(), false).unwrap();
    let options =
        ConsolidateOptions::default().with_removal(RemovalAction::Archive(archive.clone()));
    let result = consolidate(&report.groups, &options).unwrap();

    assert_eq!(result.removed_count, 1);
    assert!(archive.join("b.txt").exists());
}

#[test]
fn test_archive_path_is_a_file() {
    let assets = tempdir().unwrap();
    write(assets.path(), "a.txt", b"x");
    let dup = write(assets.path(), "b.txt", b"x");
    let not_dir = write(assets.path(), "archive", b"file");

    let report = scan(assets.path(), true).unwrap();
    let options = ConsolidateOptions::default().with_removal(RemovalAction::Archive(not_dir));
    let err = consolidate(&report.groups, &options).unwrap_err();

    assert!(matches!(err, ConsolidateError::ArchiveNotADirectory(_)));
    assert!(dup.exists());
}
