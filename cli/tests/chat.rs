//! `edubot chat` integration tests.

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_one_shot_message() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["chat", "--message", "Tell me about admissions"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("admission process")
                .and(predicate::str::contains("1. What are the eligibility requirements?")),
        );
}

#[test]
fn test_interactive_session() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .arg("chat")
        .write_stdin("hostel facilities\nrate 5 very helpful\nexit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Thank you for your feedback")
                .and(predicate::str::contains("Goodbye!")),
        );
}

#[test]
fn test_invalid_rating_shows_usage() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .arg("c")
        .write_stdin("rate 11\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: rate <1-5>"));
}

#[test]
fn test_html_output() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["chat", "--html", "--message", "What is the fee structure?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<div"));
}
