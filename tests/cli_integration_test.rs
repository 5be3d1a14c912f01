mod common;

use std::process::{Command, Output};

use common::{data_dir, minimal_record, populate_mixed, write_file};
use ddms_validate::SchemaVersion;
use tempfile::TempDir;

fn ddms_validate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ddms-validate"))
        .args(args)
        .arg("--vocabularies")
        .arg(data_dir())
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ddms-validate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_cli_help_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_ddms-validate"))
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let help = stdout(&output);
    for flag in [
        "--extensions",
        "--threads",
        "--verbose",
        "--quiet",
        "--ddms-version",
        "--vocabularies",
        "--config",
        "--format",
        "--render",
        "--fail-fast",
    ] {
        assert!(help.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn test_cli_version_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_ddms-validate"))
        .arg("--version")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("ddms-validate "));
}

#[test]
fn test_all_valid_exits_zero() {
    let dir = TempDir::new().unwrap();
    for version in SchemaVersion::ALL {
        write_file(dir.path(), &format!("{version}.xml"), &minimal_record(version));
    }

    let output = ddms_validate(&["--format", "summary", dir.path().to_str().unwrap()]);

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("5 files: 5 valid, 0 invalid, 0 errors, 0 skipped"));
}

#[test]
fn test_invalid_record_exits_one() {
    let dir = TempDir::new().unwrap();
    populate_mixed(dir.path());

    let output = ddms_validate(&[dir.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let report = stdout(&output);
    assert!(report.contains("no-producer.xml"));
    assert!(report.contains("At least 1 producer role"));
    assert!(report.contains("Validation Summary:"));
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    populate_mixed(dir.path());

    let output = ddms_validate(&["--format", "json", dir.path().to_str().unwrap()]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(report["invalid_files"], 1);
    assert_eq!(report["valid_files"], SchemaVersion::ALL.len());
}

#[test]
fn test_render_single_record() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "record.xml", &minimal_record(SchemaVersion::V4_1));

    let output = ddms_validate(&["-q", "--render", "text", path.to_str().unwrap()]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("title: DDMSence"));
}

#[test]
fn test_cli_invalid_path_error() {
    let output = ddms_validate(&["/nonexistent/records"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Path does not exist"));
}

#[test]
fn test_cli_verbose_and_quiet_conflict() {
    let output = ddms_validate(&["-v", "-q", "."]);
    assert!(!output.status.success());
}
