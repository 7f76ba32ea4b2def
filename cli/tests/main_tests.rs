//! Top-level CLI behaviour: help, version, configuration errors.

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_help_lists_commands() {
    edubot_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("serve")
                .and(predicate::str::contains("chat"))
                .and(predicate::str::contains("kb"))
                .and(predicate::str::contains("loadtest")),
        );
}

#[test]
fn test_version_flag() {
    edubot_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_fails() {
    edubot_cmd().arg("teleport").assert().failure();
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("broken.toml");
    std::fs::write(&config_path, "[server]\nhost = \"not-an-ip\"\n").unwrap();

    isolated_cmd(dir.path())
        .args(["--config", config_path.to_str().unwrap(), "kb", "sections"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-an-ip"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".edubot.toml"), "[server]\nportt = 80\n").unwrap();

    isolated_cmd(dir.path())
        .args(["kb", "sections"])
        .assert()
        .failure();
}
