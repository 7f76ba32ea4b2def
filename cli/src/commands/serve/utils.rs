//! # Server Utilities
//!
//! File: cli/src/commands/serve/utils.rs
//!
//! Helpers for the startup banner.
//!
use tracing::{debug, info, warn};

/// Best-effort detection of the machine's LAN address, for the "Network URL"
/// line of the banner. Falls back to `"localhost"`.
pub fn get_local_ip() -> String {
    let commands = [
        // macOS / BSD
        "ipconfig getifaddr en0",
        "ipconfig getifaddr en1",
        // Linux
        "ip addr show | grep 'inet ' | grep -v '127.0.0.1' | head -n 1 | awk '{print $2}' | cut -d/ -f1",
        "ifconfig | grep 'inet ' | grep -v '127.0.0.1' | head -n 1 | awk '{print $2}'",
    ];

    for cmd_str in commands {
        match std::process::Command::new("sh").arg("-c").arg(cmd_str).output() {
            Ok(output) if output.status.success() => {
                let ip = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if is_usable_ip(&ip) {
                    info!("Found local IP: {}", ip);
                    return ip;
                }
            }
            Ok(output) => {
                debug!(
                    "Command '{}' failed or returned empty: status={:?}",
                    cmd_str,
                    output.status.code()
                );
            }
            Err(e) => warn!("Error executing command '{}': {}", cmd_str, e),
        }
    }

    warn!("Could not detect local network IP, falling back to 'localhost'");
    "localhost".to_string()
}

fn is_usable_ip(candidate: &str) -> bool {
    candidate
        .parse::<std::net::IpAddr>()
        .is_ok_and(|ip| !ip.is_loopback() && !ip.is_unspecified())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_usable_ip() {
        assert!(is_usable_ip("192.168.1.20"));
        assert!(!is_usable_ip("127.0.0.1"));
        assert!(!is_usable_ip("0.0.0.0"));
        assert!(!is_usable_ip(""));
        assert!(!is_usable_ip("localhost"));
    }

    #[test]
    fn test_get_local_ip_never_empty() {
        assert!(!get_local_ip().is_empty());
    }
}
