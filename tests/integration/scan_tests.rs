use asset_tidy::duplicates::{scan, DuplicateFinder, FinderConfig, FinderError};
use asset_tidy::scanner::WalkerConfig;
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
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let report = scan(dir.path(), true).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.total_files, 0);
    assert_eq!(report.total_duplicates, 0);
    assert_eq!(report.total_savings, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let report = scan(dir.path(), true).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.total_files, 3);
}

#[test]
fn test_scan_single_pair() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello");
    let copy = write(dir.path(), "a_copy.txt", b"hello");

    let report = scan(dir.path(), true).unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.files, vec![a.clone(), copy]);
    assert_eq!(group.canonical(), a.as_path());
    assert_eq!(group.size, 5);
    assert_eq!(report.total_duplicates, 1);
    assert_eq!(report.total_savings, 5);
}

#[test]
fn test_scan_non_recursive_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "nested/a.txt", b"hello");
    write(dir.path(), "nested/deeper/b.txt", b"hello");

    let flat = scan(dir.path(), false).unwrap();
    assert_eq!(flat.total_files, 1);
    assert!(flat.groups.is_empty());

    let deep = scan(dir.path(), true).unwrap();
    assert_eq!(deep.total_files, 3);
    assert_eq!(deep.groups.len(), 1);
    assert_eq!(deep.groups[0].len(), 3);
}

#[test]
fn test_scan_missing_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = scan(&missing, true).unwrap_err();

    assert!(matches!(err, FinderError::PathNotFound(_)));
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_scan_root_is_file() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "file.txt", b"x");

    let err = scan(&file, true).unwrap_err();

    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "img/logo.png", b"png-bytes");
    write(dir.path(), "img/logo-2.png", b"png-bytes");
    write(dir.path(), "fonts/a.woff", b"font");
    write(dir.path(), "fonts/b.woff", b"font");
    write(dir.path(), "fonts/c.woff", b"font");
    write(dir.path(), "unique.css", b"body{}");

    let first = scan(dir.path(), true).unwrap();
    let second = scan(dir.path(), true).unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.total_files, second.total_files);
    assert_eq!(first.total_duplicates, second.total_duplicates);
    assert_eq!(first.total_savings, second.total_savings);
}

#[test]
fn test_scan_savings_accounting() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write(dir.path(), &format!("big_{i}.bin"), &[7u8; 1000]);
    }
    write(dir.path(), "small_a.txt", b"abc");
    write(dir.path(), "small_b.txt", b"abc");

    let report = scan(dir.path(), true).unwrap();

    let expected: u64 = report
        .groups
        .iter()
        .map(|g| g.size * (g.files.len() as u64 - 1))
        .sum();
    assert_eq!(report.total_savings, expected);
    assert_eq!(report.total_savings, 3 * 1000 + 3);
    assert_eq!(report.total_duplicates, 4);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"aaaa");
    write(dir.path(), "b.txt", b"bbbb");
    write(dir.path(), "c.txt", b"aaaa");

    let report = scan(dir.path(), true).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    for group in &report.groups {
        for file in &group.files {
            assert_eq!(fs::metadata(file).unwrap().len(), group.size);
        }
    }
}

#[test]
fn test_scan_groups_sorted_by_canonical() {
    let dir = tempdir().unwrap();
    write(dir.path(), "z1.txt", b"zz");
    write(dir.path(), "z2.txt", b"zz");
    write(dir.path(), "a1.txt", b"aaa");
    write(dir.path(), "a2.txt", b"aaa");

    let report = scan(dir.path(), true).unwrap();

    assert_eq!(report.groups.len(), 2);
    assert!(report.groups[0].canonical() < report.groups[1].canonical());
    assert!(report.groups[0]
        .canonical()
        .to_string_lossy()
        .ends_with("a1.txt"));
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".gitkeep", b"");
    write(dir.path(), "sub/.gitkeep", b"");

    let report = scan(dir.path(), true).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 0);
    assert_eq!(report.total_savings, 0);
}

#[test]
fn test_scan_with_ignore_patterns() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.js", b"same");
    write(dir.path(), "a.js.map", b"same");

    let config = FinderConfig::default().with_walker_config(
        WalkerConfig::default().with_ignore_patterns(vec!["*.map".to_string()]),
    );
    let report = DuplicateFinder::new(config).scan(dir.path()).unwrap();

    assert_eq!(report.total_files, 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_scan_paranoid_matches_default() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");

    let normal = scan(dir.path(), true).unwrap();
    let paranoid = DuplicateFinder::new(FinderConfig::default().with_paranoid(true))
        .scan(dir.path())
        .unwrap();

    assert_eq!(normal.groups, paranoid.groups);
}

#[test]
fn test_scan_single_thread_matches_parallel() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("f{i:02}.txt"), format!("{}", i % 5).as_bytes());
    }

    let single = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .scan(dir.path())
        .unwrap();
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .scan(dir.path())
        .unwrap();

    assert_eq!(single.groups, parallel.groups);
    assert_eq!(single.groups.len(), 5);
}

#[test]
fn test_scan_ignores_gitignore_in_root() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".gitignore", b"*.txt\n");
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "a_copy.txt", b"hello");

    let report = scan(dir.path(), true).unwrap();

    assert_eq!(report.total_files, 3);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].canonical(), dir.path().join("a.txt"));
}
