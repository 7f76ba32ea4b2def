//! # EduBot Server Configuration
//!
//! File: cli/src/commands/serve/config.rs
//!
//! ## Overview
//!
//! Resolves the effective settings for `edubot serve`. The layered file
//! configuration (`core::config`) provides the base; command-line flags win
//! whenever they differ from their defaults, meaning the user typed them.
//!
//! ## Examples
//!
//! ```bash
//! # Defaults from config files
//! edubot serve
//!
//! # Bind to all interfaces on port 8080 and serve ./public under /static
//! edubot serve --host 0.0.0.0 --port 8080 --static-dir ./public
//! ```
//!
use crate::core::config::Config;
use crate::core::error::{EdubotError, Result};
use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::{env, path::PathBuf};
use tracing::debug;

/// Arguments for `edubot serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on. The next free port is used if it is taken.
    #[arg(long, short, default_value_t = 5000)]
    pub port: u16,

    /// Interface to bind (`0.0.0.0` for all).
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Directory served under `/static`.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Disable CORS headers.
    #[arg(long)]
    pub no_cors: bool,

    /// Disable rate limiting of chat requests.
    #[arg(long)]
    pub no_rate_limit: bool,
}

/// Everything the server needs after merging flags over file configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub enable_cors: bool,
    pub prune_interval_secs: u64,
    /// The full application config, with flag overrides applied.
    pub app: Config,
}

/// Merges `args` over `config` and validates the static directory.
pub async fn load_and_merge_config(args: ServeArgs, mut config: Config) -> Result<ServerConfig> {
    let cli_defaults = ServeArgs::parse_from([""]);

    let mut host: IpAddr = config.server.host.parse().map_err(|e| {
        EdubotError::Config(format!("Invalid server.host '{}': {}", config.server.host, e))
    })?;
    if args.host != cli_defaults.host {
        host = args.host;
    }
    let port = if args.port != cli_defaults.port {
        args.port
    } else {
        config.server.port
    };
    let enable_cors = config.server.enable_cors && !args.no_cors;
    if args.no_rate_limit {
        config.rate_limit.enabled = false;
    }
    let static_dir = match args.static_dir.or(config.server.static_dir.as_ref().map(PathBuf::from)) {
        Some(dir) => Some(resolve_directory(dir).await?),
        None => None,
    };

    config.server.port = port;
    config.server.host = host.to_string();
    config.server.enable_cors = enable_cors;

    Ok(ServerConfig {
        host,
        port,
        static_dir,
        enable_cors,
        prune_interval_secs: config.server.prune_interval_secs,
        app: config,
    })
}

/// Makes `dir` absolute and canonical, failing unless it is an existing directory.
async fn resolve_directory(dir: PathBuf) -> Result<PathBuf> {
    let absolute_path = if dir.is_absolute() {
        dir
    } else {
        env::current_dir()
            .context("Failed to get current working directory")?
            .join(dir)
    };
    let canonical_path = tokio::fs::canonicalize(&absolute_path)
        .await
        .with_context(|| format!("Directory '{}' could not be found or accessed", absolute_path.display()))?;
    let metadata = tokio::fs::metadata(&canonical_path)
        .await
        .with_context(|| format!("Failed to get metadata for path '{}'", canonical_path.display()))?;
    if !metadata.is_dir() {
        anyhow::bail!("Path is not a directory: {}", canonical_path.display());
    }
    debug!("Resolved static directory to: {}", canonical_path.display());
    Ok(canonical_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> ServeArgs {
        let mut full = vec!["serve"];
        full.extend_from_slice(argv);
        ServeArgs::parse_from(full)
    }

    #[tokio::test]
    async fn test_defaults_come_from_config() -> Result<()> {
        let mut config = Config::default();
        config.server.port = 6100;
        config.server.host = "0.0.0.0".to_string();
        let merged = load_and_merge_config(args(&[]), config).await?;
        assert_eq!(merged.port, 6100);
        assert_eq!(merged.host, "0.0.0.0".parse::<IpAddr>()?);
        assert!(merged.enable_cors);
        assert!(merged.static_dir.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_flags_override_config() -> Result<()> {
        let mut config = Config::default();
        config.server.port = 6100;
        let merged =
            load_and_merge_config(args(&["--port", "7000", "--no-cors", "--no-rate-limit"]), config).await?;
        assert_eq!(merged.port, 7000);
        assert_eq!(merged.app.server.port, 7000);
        assert!(!merged.enable_cors);
        assert!(!merged.app.rate_limit.enabled);
        Ok(())
    }

    #[tokio::test]
    async fn test_static_dir_resolved() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_string_lossy().to_string();
        let merged = load_and_merge_config(args(&["--static-dir", &path]), Config::default()).await?;
        assert_eq!(merged.static_dir, Some(std::fs::canonicalize(temp_dir.path())?));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_static_dir_fails() {
        let result = load_and_merge_config(
            args(&["--static-dir", "/path/that/definitely/does/not/exist"]),
            Config::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_host_fails() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();
        assert!(load_and_merge_config(args(&[]), config).await.is_err());
    }
}
