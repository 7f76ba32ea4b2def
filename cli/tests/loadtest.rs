//! `edubot loadtest` integration tests. None of these need a running server.

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_invalid_host_fails() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["loadtest", "--host", "not a url", "--duration", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid host"));
}

#[test]
fn test_zero_users_fails() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["loadtest", "--users", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one user"));
}

#[test]
fn test_unknown_scenario_rejected() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["loadtest", "--scenario", "tsunami"])
        .assert()
        .failure();
}

#[test]
fn test_unreachable_server_reports_failures() {
    let dir = tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let host = format!("http://127.0.0.1:{}", free_port());

    isolated_cmd(dir.path())
        .args([
            "loadtest",
            "--host",
            &host,
            "--users",
            "2",
            "--spawn-rate",
            "50",
            "--duration",
            "1",
            "--scenario",
            "endurance",
            "--json",
            report_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aggregated").and(predicate::str::contains("Failures:")));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["users"], 2);
    assert_eq!(report["total"]["count"], report["total"]["failures"]);
}
