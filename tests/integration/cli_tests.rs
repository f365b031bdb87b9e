use asset_tidy::cli::Cli;
use asset_tidy::duplicates::FinderError;
use asset_tidy::error::ExitCode;
use asset_tidy::run_app;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str], config: &Path) -> anyhow::Result<ExitCode> {
    let config = config.to_string_lossy().into_owned();
    let mut full = vec!["asset-tidy", "-q", "--config", config.as_str()];
    full.extend_from_slice(args);
    run_app(Cli::try_parse_from(full).unwrap())
}

fn binary(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_asset-tidy"));
    cmd.arg("-q")
        .arg("--config")
        .arg(config)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_report_only_run_writes_json() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    write(&assets, "a.txt", b"hello");
    let copy = write(&assets, "a_copy.txt", b"hello");
    let report = work.path().join("report.json");

    let code = run(
        &[
            "find-duplicates",
            assets.to_str().unwrap(),
            "--output-file",
            report.to_str().unwrap(),
        ],
        &work.path().join("config.toml"),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(copy.exists());

    let value = read_json(&report);
    assert_eq!(value["success"], true);
    assert_eq!(value["totalFiles"], 2);
    assert_eq!(value["totalDuplicates"], 1);
    assert_eq!(value["totalSavings"], 5);
    assert_eq!(value["groups"][0]["size"], 5);
    assert_eq!(value["groups"][0]["hash"].as_str().unwrap().len(), 64);
    assert!(value.get("removedCount").is_none());
}

#[test]
fn test_delete_with_refs_and_yes() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    let refs_a = work.path().join("src");
    let refs_b = work.path().join("content");
    write(&assets, "a.txt", b"hello");
    let copy = write(&assets, "a_copy.txt", b"hello");
    let page = write(&refs_a, "page.tsx", b"<a href=\"/a_copy.txt\" />");
    let post = write(&refs_b, "post.md", b"[x](/a_copy.txt)");
    let report = work.path().join("report.json");
    let refs_arg = format!("{},{}", refs_a.display(), refs_b.display());

    let code = run(
        &[
            "find-duplicates",
            assets.to_str().unwrap(),
            "--refs",
            &refs_arg,
            "--delete",
            "--yes",
            "--output-file",
            report.to_str().unwrap(),
        ],
        &work.path().join("config.toml"),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!copy.exists());
    assert_eq!(fs::read_to_string(page).unwrap(), "<a href=\"/a.txt\" />");
    assert_eq!(fs::read_to_string(post).unwrap(), "[x](/a.txt)");

    let value = read_json(&report);
    assert_eq!(value["removedCount"], 1);
    assert_eq!(value["referencesUpdated"], 2);
}

#[test]
fn test_archive_with_yes() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    let archive = work.path().join("archive");
    write(&assets, "a.txt", b"hello");
    write(&assets, "a_copy.txt", b"hello");

    let code = run(
        &[
            "find-duplicates",
            assets.to_str().unwrap(),
            "--archive",
            archive.to_str().unwrap(),
            "--yes",
        ],
        &work.path().join("config.toml"),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(archive.join("a_copy.txt").exists());
    assert!(assets.join("a.txt").exists());
}

#[test]
fn test_missing_root_fails_and_writes_failure_report() {
    let work = tempdir().unwrap();
    let missing = work.path().join("nope");
    let report = work.path().join("report.json");

    let err = run(
        &[
            "find-duplicates",
            missing.to_str().unwrap(),
            "--output-file",
            report.to_str().unwrap(),
        ],
        &work.path().join("config.toml"),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);

    let value = read_json(&report);
    assert_eq!(value["success"], false);
    assert!(!value["error"].as_str().unwrap().is_empty());
    assert!(value.get("groups").is_none());
}

#[test]
fn test_no_duplicates_is_success() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    write(&assets, "a.txt", b"one");
    write(&assets, "b.txt", b"two");

    let code = run(
        &["find-duplicates", assets.to_str().unwrap(), "--delete", "--yes"],
        &work.path().join("config.toml"),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(assets.join("b.txt").exists());
}

#[test]
fn test_zero_io_threads_rejected() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    fs::create_dir_all(&assets).unwrap();

    let result = run(
        &["find-duplicates", assets.to_str().unwrap(), "--io-threads", "0"],
        &work.path().join("config.toml"),
    );

    assert!(result.is_err());
}

#[test]
fn test_config_file_ignore_patterns_apply() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    write(&assets, "app.js", b"same");
    write(&assets, "app.js.map", b"same");
    let config = write(work.path(), "config.toml", b"ignore_patterns = [\"*.map\"]");
    let report = work.path().join("report.json");

    run(
        &[
            "find-duplicates",
            assets.to_str().unwrap(),
            "--output-file",
            report.to_str().unwrap(),
        ],
        &config,
    )
    .unwrap();

    let value = read_json(&report);
    assert_eq!(value["totalFiles"], 1);
    assert_eq!(value["groups"].as_array().unwrap().len(), 0);
}

#[test]
fn test_init_config_writes_file() {
    let work = tempdir().unwrap();
    let target = work.path().join("cfg/config.toml");

    let code = run(
        &["init-config", target.to_str().unwrap()],
        &work.path().join("unused.toml"),
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(fs::read_to_string(&target).unwrap().contains("io_threads = 4"));

    let again = run(
        &["init-config", target.to_str().unwrap()],
        &work.path().join("unused.toml"),
    );
    assert!(again.is_err());

    let forced = run(
        &["init-config", target.to_str().unwrap(), "--force"],
        &work.path().join("unused.toml"),
    );
    assert!(forced.is_ok());
}

#[test]
fn test_destructive_run_refuses_without_terminal() {
    let work = tempdir().unwrap();
    let assets = work.path().join("public");
    let kept = write(&assets, "a.txt", b"hello");
    let copy = write(&assets, "a_copy.txt", b"hello");

    let output = binary(&work.path().join("config.toml"))
        .arg("find-duplicates")
        .arg(&assets)
        .arg("--delete")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("AT001"));
    assert!(kept.exists());
    assert!(copy.exists());
}

#[test]
fn test_unknown_command_exits_with_general_error() {
    let work = tempdir().unwrap();

    let status = binary(&work.path().join("config.toml"))
        .arg("dedupe")
        .arg(work.path())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_missing_directory_argument_exits_with_general_error() {
    let work = tempdir().unwrap();

    let status = binary(&work.path().join("config.toml"))
        .arg("find-duplicates")
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_help_exits_successfully() {
    let work = tempdir().unwrap();

    let status = binary(&work.path().join("config.toml"))
        .arg("--help")
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
}
