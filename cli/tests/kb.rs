//! `edubot kb` integration tests.

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_kb_show_section() {
    let dir = tempdir().unwrap();
    let output = isolated_cmd(dir.path())
        .args(["kb", "show", "admissions"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(value["process"].is_array());
    assert!(value["eligibility"].is_object());
}

#[test]
fn test_kb_show_unknown_section() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["k", "show", "cafeteria_menu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown knowledge base section 'cafeteria_menu'"));
}

#[test]
fn test_kb_search() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["kb", "search", "hostel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"facilities\""));
}

#[test]
fn test_kb_search_requires_keywords() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path()).args(["kb", "search"]).assert().failure();
}

#[test]
fn test_kb_sections() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["kb", "sections"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admissions").and(predicate::str::contains("dining")));
}

#[test]
fn test_kb_offering() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["kb", "offering", "phd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Computer Science & Engineering"));
}

#[test]
fn test_kb_offering_unknown_program() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["kb", "offering", "Diploma"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No department offers 'Diploma'."));
}
