//! Integration tests for the pyhost binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command isolated from the user's config and log files.
fn pyhost_cmd(dir: &TempDir) -> Command {
    let config_path = dir.path().join("pyhost.toml");
    if !config_path.exists() {
        let log_file = dir.path().join("pyhost.log");
        fs::write(
            &config_path,
            format!("log-file = {:?}\n", log_file.to_string_lossy()),
        )
        .unwrap();
    }
    let mut cmd = cargo_bin_cmd!("pyhost");
    cmd.env("PYHOST_CONFIG", &config_path);
    cmd
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pyhost"));
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("embedded Python interpreter"));
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir).arg("invalid").assert().failure();
}

#[test]
fn test_config_set_and_show() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["config", "set", "search-path", "/srv/a,/srv/b"])
        .assert()
        .success();
    pyhost_cmd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration"))
        .stdout(predicate::str::contains("search-path"))
        .stdout(predicate::str::contains("/srv/a,/srv/b"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["config", "set", "nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key: nope"));
}

#[test]
fn test_config_path_honors_env() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pyhost.toml"));
}

#[test]
fn test_eval_prints_repr() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["-q", "eval", "1 + 2"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn test_eval_error_shows_exception() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["-q", "eval", "1 / 0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ZeroDivisionError"));
}

#[test]
fn test_import_with_attribute() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["-q", "import", "json", "--attr", "dumps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<function dumps"));
}

#[test]
fn test_import_missing_module_fails() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["-q", "import", "does.not.exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ModuleNotFoundError"));
}

#[test]
fn test_builtins_member() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["-q", "builtins", "len"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<built-in function len>"));
}

#[test]
fn test_search_path_reaches_sys_path() {
    let dir = TempDir::new().unwrap();
    let app = TempDir::new().unwrap();
    fs::write(app.path().join("pyhost_cli_fixture.py"), "ANSWER = 42\n").unwrap();
    let app_path = app.path().to_string_lossy().into_owned();

    pyhost_cmd(&dir)
        .args(["-q", "--search-path", &app_path, "import", "pyhost_cli_fixture", "--attr", "ANSWER"])
        .assert()
        .success()
        .stdout(predicate::str::diff("42\n"));
}

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    let output = pyhost_cmd(&dir)
        .args(["-q", "status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"], "Started");
    assert_eq!(report["provider"], "env");
    assert!(report["version"].as_str().unwrap().starts_with('3'));
    assert!(report["sys_path"].is_array());
}

#[test]
fn test_redirected_output_goes_to_log() {
    let dir = TempDir::new().unwrap();
    pyhost_cmd(&dir)
        .args(["-q", "--redirect-output", "eval", "print('routed') or 7"])
        .assert()
        .success()
        .stdout(predicate::str::diff("7\n"));

    let log = fs::read_to_string(dir.path().join("pyhost.log")).unwrap();
    assert!(log.contains("[PYTHON] STDOUT routed"));
}
