//! `edubot serve` integration tests.

mod common;
use common::*;
use predicates::prelude::*;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::{Child, Stdio};
use std::time::{Duration, Instant};
use tempfile::tempdir;

/// Kills the server when the test ends, pass or fail.
struct ServerGuard(Child);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn http_get(port: u16, path: &str) -> Option<String> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    write!(
        stream,
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    )
    .ok()?;
    let mut response = String::new();
    stream.read_to_string(&mut response).ok()?;
    Some(response)
}

#[test]
fn test_serve_answers_health_check() {
    let dir = tempdir().unwrap();
    let port = free_port();
    let binary = assert_cmd::cargo::cargo_bin("edubot");
    let child = std::process::Command::new(binary)
        .args(["serve", "--port", &port.to_string()])
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("RUST_LOG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let _server = ServerGuard(child);

    let deadline = Instant::now() + Duration::from_secs(15);
    let response = loop {
        if let Some(response) = http_get(port, "/api/health") {
            break response;
        }
        assert!(Instant::now() < deadline, "server did not start on port {}", port);
        std::thread::sleep(Duration::from_millis(100));
    };
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("\"healthy\""));

    let page = http_get(port, "/about").unwrap();
    assert!(page.contains("Nalanda"));
}

#[test]
fn test_serve_rejects_missing_static_dir() {
    let dir = tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["serve", "--static-dir", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be found"));
}
