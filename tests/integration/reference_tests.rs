use asset_tidy::actions::{rewrite_references, ReplacementMap, DEFAULT_REFERENCE_EXTENSIONS};
use asset_tidy::duplicates::DuplicateGroup;
use asset_tidy::warning::Operation;
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

fn group(files: &[&str]) -> DuplicateGroup {
    DuplicateGroup::new([9; 32], 10, files.iter().map(PathBuf::from).collect())
}

fn extensions() -> Vec<String> {
    DEFAULT_REFERENCE_EXTENSIONS
        .iter()
        .map(|e| (*e).to_string())
        .collect()
}

#[test]
fn test_regex_special_characters_are_literal() {
    let refs = tempdir().unwrap();
    let page = write(
        refs.path(),
        "page.html",
        b"<img src=\"icon_(1)+[x].png\"> <img src=\"iconX1Y+x.png\">",
    );

    let (map, _) = ReplacementMap::build(&[group(&["/a/icon.png", "/a/icon_(1)+[x].png"])]);
    let summary = rewrite_references(&[refs.path().to_path_buf()], &map, &extensions(), None);

    assert_eq!(summary.files_updated, 1);
    assert_eq!(
        fs::read_to_string(page).unwrap(),
        "<img src=\"icon.png\"> <img src=\"iconX1Y+x.png\">"
    );
}

#[test]
fn test_dot_in_name_does_not_match_any_char() {
    let refs = tempdir().unwrap();
    let page = write(refs.path(), "notes.md", b"a_copyXtxt stays");

    let (map, _) = ReplacementMap::build(&[group(&["/a/a.txt", "/a/a_copy.txt"])]);
    let summary = rewrite_references(&[refs.path().to_path_buf()], &map, &extensions(), None);

    assert_eq!(summary.files_updated, 0);
    assert_eq!(fs::read_to_string(page).unwrap(), "a_copyXtxt stays");
}

#[test]
fn test_only_allowed_extensions_rewritten() {
    let refs = tempdir().unwrap();
    let allowed = write(refs.path(), "component.vue", b"a_copy.txt");
    let image = write(refs.path(), "thumb.png", b"a_copy.txt");
    let unknown = write(refs.path(), "data.bin", b"a_copy.txt");

    let (map, _) = ReplacementMap::build(&[group(&["/a/a.txt", "/a/a_copy.txt"])]);
    let summary = rewrite_references(&[refs.path().to_path_buf()], &map, &extensions(), None);

    assert_eq!(summary.files_updated, 1);
    assert_eq!(fs::read_to_string(allowed).unwrap(), "a.txt");
    assert_eq!(fs::read_to_string(image).unwrap(), "a_copy.txt");
    assert_eq!(fs::read_to_string(unknown).unwrap(), "a_copy.txt");
}

#[test]
fn test_custom_extension_list() {
    let refs = tempdir().unwrap();
    let liquid = write(refs.path(), "layout.liquid", b"a_copy.txt");
    let js = write(refs.path(), "main.js", b"a_copy.txt");

    let (map, _) = ReplacementMap::build(&[group(&["/a/a.txt", "/a/a_copy.txt"])]);
    let summary = rewrite_references(
        &[refs.path().to_path_buf()],
        &map,
        &["liquid".to_string()],
        None,
    );

    assert_eq!(summary.files_updated, 1);
    assert_eq!(fs::read_to_string(liquid).unwrap(), "a.txt");
    assert_eq!(fs::read_to_string(js).unwrap(), "a_copy.txt");
}

#[test]
fn test_multiple_reference_dirs_recursive() {
    let src = tempdir().unwrap();
    let content = tempdir().unwrap();
    let deep = write(src.path(), "app/components/Logo.tsx", b"'/logo_old.svg'");
    let post = write(content.path(), "blog/2024/post.mdx", b"![](/logo_old.svg)");
    write(content.path(), "blog/untouched.mdx", b"nothing here");

    let (map, _) = ReplacementMap::build(&[group(&["/p/logo.svg", "/p/logo_old.svg"])]);
    let summary = rewrite_references(
        &[src.path().to_path_buf(), content.path().to_path_buf()],
        &map,
        &extensions(),
        None,
    );

    assert_eq!(summary.files_updated, 2);
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(fs::read_to_string(deep).unwrap(), "'/logo.svg'");
    assert_eq!(fs::read_to_string(post).unwrap(), "![](/logo.svg)");
}

#[test]
fn test_unreadable_file_is_skipped() {
    let refs = tempdir().unwrap();
    write(refs.path(), "latin1.css", &[0x61, 0xe9, 0x62]);
    let good = write(refs.path(), "ok.css", b"url(a_copy.txt)");

    let (map, _) = ReplacementMap::build(&[group(&["/a/a.txt", "/a/a_copy.txt"])]);
    let summary = rewrite_references(&[refs.path().to_path_buf()], &map, &extensions(), None);

    assert_eq!(summary.files_updated, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].operation, Operation::Rewrite);
    assert_eq!(fs::read_to_string(good).unwrap(), "url(a.txt)");
}

#[test]
fn test_all_occurrences_replaced() {
    let refs = tempdir().unwrap();
    let page = write(
        refs.path(),
        "index.html",
        b"a_copy.txt a_copy.txt\na_copy.txt",
    );

    let (map, _) = ReplacementMap::build(&[group(&["/a/a.txt", "/a/a_copy.txt"])]);
    rewrite_references(&[refs.path().to_path_buf()], &map, &extensions(), None);

    assert_eq!(fs::read_to_string(page).unwrap(), "a.txt a.txt\na.txt");
}
