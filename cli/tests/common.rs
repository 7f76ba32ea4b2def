//! # EduBot CLI Integration Test Helpers
//!
//! File: cli/tests/common.rs
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! is its own crate and pulls this in with `mod common;`.
//!

// Not every test file uses every helper.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

/// The compiled `edubot` binary with logging env vars cleared.
pub fn edubot_cmd() -> Command {
    let mut cmd = Command::cargo_bin("edubot").expect("Failed to find edubot binary for testing");
    cmd.env_remove("RUST_LOG").env_remove("EDUBOT_CONFIG");
    cmd
}

/// Like [`edubot_cmd`], but run from `dir` with `dir` as the home directory so
/// neither the developer's user config nor a stray `.edubot.toml` leaks in.
pub fn isolated_cmd(dir: &Path) -> Command {
    let mut cmd = edubot_cmd();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

/// A localhost port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("Failed to find a free port")
}
