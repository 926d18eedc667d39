//! CLI subprocess integration tests.
//!
//! These tests invoke the `hangar` binary as a subprocess and verify exit
//! codes, stdout content, and JSON output shape.

use std::path::{Path, PathBuf};
use std::process::Command;

fn hangar_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hangar"));
    cmd.env_remove("HANGAR_LOG");
    cmd.env_remove("HANGAR_CONFIG");
    cmd
}

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("hangar.toml");
    std::fs::write(
        &path,
        format!(
            r#"{extra}
[healing]
default_timeout_secs = 30

[[nodes]]
address = "10.0.0.1"
metadata = {{ pool = "default" }}

[[nodes]]
address = "10.0.0.2"
metadata = {{ pool = "batch", region = "eu" }}
"#
        ),
    )
    .unwrap();
    path
}

#[test]
fn cli_version_exits_zero() {
    let output = hangar_bin().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("hangar"));
}

#[test]
fn nodes_lists_configured_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let output = hangar_bin()
        .args(["--config", config.to_str().unwrap(), "nodes"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("10.0.0.1"));
    assert!(stdout.contains("10.0.0.2"));
    assert!(stdout.contains("pool=default"));
}

#[test]
fn nodes_label_filter_is_or() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let output = hangar_bin()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--json",
            "nodes",
            "--label",
            "pool=default",
            "--label",
            "region=eu",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let nodes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(nodes.as_array().unwrap().len(), 2);

    let output = hangar_bin()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--json",
            "nodes",
            "--label",
            "pool=batch",
        ])
        .output()
        .unwrap();
    let nodes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(nodes.as_array().unwrap().len(), 1);
    assert_eq!(nodes[0]["address"], "10.0.0.2");
}

#[test]
fn heal_second_attempt_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let output = hangar_bin()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--json",
            "heal",
            "10.0.0.1",
            "--attempts",
            "3",
            "--failure",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["attempts"], serde_json::json!([true, false, false]));
    assert_eq!(report["timeout_secs"], 30);
    assert_eq!(report["released"], true);
}

#[test]
fn verbose_heal_logs_each_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let output = hangar_bin()
        .args(["--config", config.to_str().unwrap(), "--verbose", "heal", "10.0.0.2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("healing lock attempt on 10.0.0.2: acquired=true"));
    assert!(stderr.contains("healing lock attempt on 10.0.0.2: acquired=false"));
}

#[test]
fn heal_unknown_node_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let output = hangar_bin()
        .args(["--config", config.to_str().unwrap(), "heal", "10.9.9.9"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such node"));
}

#[test]
fn cycle_stop_running_box_applies() {
    let output = hangar_bin()
        .args(["--json", "cycle", "stop", "--state", "running", "--hard"])
        .env("HOME", tempfile::tempdir().unwrap().path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "applied");
    assert_eq!(report["operation"], "hard-stop");
    let log = report["log"].as_str().unwrap();
    assert!(log.contains("mock hard-stop demo"));
    assert!(log.contains("    stop (demo, running, "));
}

#[test]
fn cycle_start_running_box_is_skipped() {
    let output = hangar_bin()
        .args(["--json", "cycle", "start", "--state", "running"])
        .env("HOME", tempfile::tempdir().unwrap().path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "skipped");
    let log = report["log"].as_str().unwrap();
    assert!(!log.contains("mock start"));
    assert!(log.contains("start not performed: lifecycle not allowed from state running"));
}

#[test]
fn cycle_writes_box_log_file_when_log_dir_set() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let config = write_config(
        dir.path(),
        &format!("log_dir = {:?}\n", log_dir.to_str().unwrap()),
    );
    let output = hangar_bin()
        .args([
            "--config",
            config.to_str().unwrap(),
            "cycle",
            "restart",
            "--state",
            "post_error",
            "--name",
            "api",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let content = std::fs::read_to_string(log_dir.join("api-box.log")).unwrap();
    assert!(content.contains("mock restart api"));
}

#[test]
fn invalid_config_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[healing]\ndefault_timeout_secs = 0\n").unwrap();
    let output = hangar_bin()
        .args(["--config", path.to_str().unwrap(), "nodes"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_operation_rejected_by_parser() {
    let output = hangar_bin().args(["cycle", "destroy"]).output().unwrap();
    assert!(!output.status.success());
}
