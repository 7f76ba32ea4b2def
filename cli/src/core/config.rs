//! # EduBot Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates EduBot's configuration. Settings are
//! layered so a deployment can keep machine-wide defaults in the user config
//! file and override individual values per project directory.
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file passed with `--config`, or the project-specific
//!    `.edubot.toml` in the current directory or its ancestors
//! 2. User-specific `~/.config/edubot/config.toml`
//! 3. Default values defined in the code
//!
//! Command-line flags of individual commands (`serve --port`, `loadtest --users`)
//! are applied on top of the merged result by the commands themselves.
//!
//! ## Examples
//!
//! ```toml
//! [server]
//! port = 5000
//! static_dir = "~/edubot/static"
//!
//! [conversation]
//! idle_timeout_secs = 900
//!
//! [rate_limit]
//! requests_per_minute = 30
//! ```
//!
//! ```rust
//! let cfg = config::load_config(None)?;
//! let port = cfg.server.port;
//! ```
//!
use crate::core::error::{EdubotError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub conversation: ConversationSection,
    #[serde(default)]
    pub context: ContextSection,
    #[serde(default)]
    pub rate_limit: RateLimitSection,
    #[serde(default)]
    pub autocomplete: AutocompleteSection,
    #[serde(default)]
    pub loadtest: LoadTestSection,
}

/// Settings for `edubot serve`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerSection {
    /// Interface to bind to.
    pub host: String,
    /// Port to listen on. The next free port is used when it is taken.
    pub port: u16,
    /// Optional directory served under `/static` (can use ~).
    pub static_dir: Option<String>,
    /// Send permissive CORS headers.
    pub enable_cors: bool,
    /// Seconds between background sweeps of idle conversations and contexts.
    pub prune_interval_secs: u64,
}

/// Conversation manager limits.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ConversationSection {
    /// Conversations idle for longer than this are dropped.
    pub idle_timeout_secs: u64,
    /// Maximum history entries kept per conversation.
    pub max_history: usize,
}

/// Context memory limits.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ContextSection {
    pub max_messages: usize,
    pub window_hours: i64,
}

/// Sliding-window limits applied to `/api/chat`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct RateLimitSection {
    pub enabled: bool,
    pub requests_per_minute: usize,
    pub requests_per_hour: usize,
    pub requests_per_day: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct AutocompleteSection {
    pub max_history: usize,
    pub min_similarity: f64,
}

/// Defaults for `edubot loadtest`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LoadTestSection {
    /// Base URL of the EduBot server under test.
    pub host: String,
    pub users: usize,
    /// Virtual users started per second.
    pub spawn_rate: f64,
    pub duration_secs: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            static_dir: None,
            enable_cors: true,
            prune_interval_secs: 60,
        }
    }
}

impl Default for ConversationSection {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            max_history: 50,
        }
    }
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            max_messages: 20,
            window_hours: 24,
        }
    }
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 60,
            requests_per_hour: 1000,
            requests_per_day: 10000,
        }
    }
}

impl Default for AutocompleteSection {
    fn default() -> Self {
        Self {
            max_history: 100,
            min_similarity: 0.6,
        }
    }
}

impl Default for LoadTestSection {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:5000".to_string(),
            users: 10,
            spawn_rate: 2.0,
            duration_secs: 30,
            timeout_secs: 10,
        }
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".edubot.toml";

/// Longest idle timeout or context window accepted from configuration.
const MAX_RETENTION_SECS: u64 = 30 * 24 * 60 * 60;

/// Loads the effective configuration.
///
/// `explicit` (the `--config` flag) is applied as a last layer over the user
/// and project files.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let explicit_config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Some(load_config_from_path(path)?)
        }
        None => None,
    };
    let mut merged_config = merge_configs(
        merge_configs(user_config.unwrap_or_default(), project_config),
        explicit_config,
    );
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "EduBot", "edubot") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.edubot.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.edubot.toml`, stopping at a `.git` boundary.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path: &Path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Takes the project value when it differs from the built-in default.
fn pick<T: PartialEq>(project: T, user: T, default: T) -> T {
    if project != default {
        project
    } else {
        user
    }
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    let d = Config::default();

    Config {
        server: ServerSection {
            host: pick(project.server.host, user.server.host, d.server.host),
            port: pick(project.server.port, user.server.port, d.server.port),
            static_dir: project.server.static_dir.or(user.server.static_dir),
            enable_cors: pick(
                project.server.enable_cors,
                user.server.enable_cors,
                d.server.enable_cors,
            ),
            prune_interval_secs: pick(
                project.server.prune_interval_secs,
                user.server.prune_interval_secs,
                d.server.prune_interval_secs,
            ),
        },
        conversation: ConversationSection {
            idle_timeout_secs: pick(
                project.conversation.idle_timeout_secs,
                user.conversation.idle_timeout_secs,
                d.conversation.idle_timeout_secs,
            ),
            max_history: pick(
                project.conversation.max_history,
                user.conversation.max_history,
                d.conversation.max_history,
            ),
        },
        context: ContextSection {
            max_messages: pick(
                project.context.max_messages,
                user.context.max_messages,
                d.context.max_messages,
            ),
            window_hours: pick(
                project.context.window_hours,
                user.context.window_hours,
                d.context.window_hours,
            ),
        },
        rate_limit: RateLimitSection {
            enabled: pick(
                project.rate_limit.enabled,
                user.rate_limit.enabled,
                d.rate_limit.enabled,
            ),
            requests_per_minute: pick(
                project.rate_limit.requests_per_minute,
                user.rate_limit.requests_per_minute,
                d.rate_limit.requests_per_minute,
            ),
            requests_per_hour: pick(
                project.rate_limit.requests_per_hour,
                user.rate_limit.requests_per_hour,
                d.rate_limit.requests_per_hour,
            ),
            requests_per_day: pick(
                project.rate_limit.requests_per_day,
                user.rate_limit.requests_per_day,
                d.rate_limit.requests_per_day,
            ),
        },
        autocomplete: AutocompleteSection {
            max_history: pick(
                project.autocomplete.max_history,
                user.autocomplete.max_history,
                d.autocomplete.max_history,
            ),
            min_similarity: pick(
                project.autocomplete.min_similarity,
                user.autocomplete.min_similarity,
                d.autocomplete.min_similarity,
            ),
        },
        loadtest: LoadTestSection {
            host: pick(project.loadtest.host, user.loadtest.host, d.loadtest.host),
            users: pick(project.loadtest.users, user.loadtest.users, d.loadtest.users),
            spawn_rate: pick(
                project.loadtest.spawn_rate,
                user.loadtest.spawn_rate,
                d.loadtest.spawn_rate,
            ),
            duration_secs: pick(
                project.loadtest.duration_secs,
                user.loadtest.duration_secs,
                d.loadtest.duration_secs,
            ),
            timeout_secs: pick(
                project.loadtest.timeout_secs,
                user.loadtest.timeout_secs,
                d.loadtest.timeout_secs,
            ),
        },
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(dir) = config.server.static_dir.as_mut() {
        *dir = shellexpand::tilde(dir.as_str()).into_owned();
        debug!("Expanded static directory: {}", dir);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.server.host.parse::<std::net::IpAddr>().is_err() {
        return Err(anyhow!(EdubotError::Config(format!(
            "Invalid server host '{}'. Expected an IP address.",
            config.server.host
        ))));
    }
    if let Some(dir) = &config.server.static_dir {
        let dir = PathBuf::from(dir);
        if !dir.exists() {
            warn!("Configured static directory '{}' does not exist.", dir.display());
        } else if !dir.is_dir() {
            return Err(anyhow!(EdubotError::Config(format!(
                "Configured static path '{}' exists but is not a directory.",
                dir.display()
            ))));
        }
    }
    if config.server.prune_interval_secs == 0 {
        return Err(anyhow!(EdubotError::Config(
            "server.prune_interval_secs must be greater than zero.".to_string()
        )));
    }
    if config.conversation.idle_timeout_secs > MAX_RETENTION_SECS {
        return Err(anyhow!(EdubotError::Config(format!(
            "conversation.idle_timeout_secs must be at most {} (30 days), got {}.",
            MAX_RETENTION_SECS, config.conversation.idle_timeout_secs
        ))));
    }
    if config.conversation.max_history == 0 {
        return Err(anyhow!(EdubotError::Config(
            "conversation.max_history must be greater than zero.".to_string()
        )));
    }
    if config.context.max_messages == 0 || config.context.window_hours <= 0 {
        return Err(anyhow!(EdubotError::Config(
            "context.max_messages and context.window_hours must be positive.".to_string()
        )));
    }
    if config.context.window_hours as u64 > MAX_RETENTION_SECS / 3600 {
        return Err(anyhow!(EdubotError::Config(format!(
            "context.window_hours must be at most {} (30 days), got {}.",
            MAX_RETENTION_SECS / 3600,
            config.context.window_hours
        ))));
    }
    let rl = &config.rate_limit;
    if rl.requests_per_minute == 0
        || rl.requests_per_minute > rl.requests_per_hour
        || rl.requests_per_hour > rl.requests_per_day
    {
        return Err(anyhow!(EdubotError::Config(format!(
            "Invalid rate limits {}/min, {}/hour, {}/day. Limits must be positive and non-decreasing.",
            rl.requests_per_minute, rl.requests_per_hour, rl.requests_per_day
        ))));
    }
    if !(0.0..=1.0).contains(&config.autocomplete.min_similarity) {
        return Err(anyhow!(EdubotError::Config(format!(
            "autocomplete.min_similarity must be within 0.0..=1.0, got {}.",
            config.autocomplete.min_similarity
        ))));
    }
    let lt = &config.loadtest;
    if !(lt.host.starts_with("http://") || lt.host.starts_with("https://")) {
        return Err(anyhow!(EdubotError::Config(format!(
            "Invalid load test host '{}'. Expected an http:// or https:// URL.",
            lt.host
        ))));
    }
    if lt.spawn_rate <= 0.0 {
        return Err(anyhow!(EdubotError::Config(
            "loadtest.spawn_rate must be greater than zero.".to_string()
        )));
    }
    info!("Configuration validation successful.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [server]
            port = 8080
            static_dir = "~/edubot/static"

            [conversation]
            idle_timeout_secs = 600

            [rate_limit]
            requests_per_minute = 30
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1"); // Default
        assert_eq!(config.server.static_dir.as_deref(), Some("~/edubot/static"));
        assert_eq!(config.conversation.idle_timeout_secs, 600);
        assert_eq!(config.conversation.max_history, 50); // Default
        assert_eq!(config.rate_limit.requests_per_minute, 30);
        assert_eq!(config.rate_limit.requests_per_hour, 1000);
        assert_eq!(config.context, ContextSection::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[server]\nprot = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_project_overrides_user() {
        let mut user = Config::default();
        user.server.port = 7000;
        user.rate_limit.requests_per_minute = 10;

        let mut project = Config::default();
        project.server.port = 9000;

        let merged = merge_configs(user, Some(project));
        assert_eq!(merged.server.port, 9000);
        // Project left it at the default, so the user value survives.
        assert_eq!(merged.rate_limit.requests_per_minute, 10);
    }

    #[test]
    fn test_merge_without_project() {
        let mut user = Config::default();
        user.loadtest.users = 42;
        let merged = merge_configs(user.clone(), None);
        assert_eq!(merged, user);
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config::default();
        config.server.static_dir = Some("~/static_test".to_string());
        expand_config_paths(&mut config).unwrap();
        let expanded = config.server.static_dir.unwrap();
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("static_test"));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_decreasing_limits() {
        let mut config = Config::default();
        config.rate_limit.requests_per_minute = 2000;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid rate limits"));
    }

    #[test]
    fn test_validate_rejects_bad_loadtest_host() {
        let mut config = Config::default();
        config.loadtest.host = "localhost:5000".to_string();
        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid load test host"));
    }

    #[test]
    fn test_validate_static_path_is_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "").unwrap();

        let mut config = Config::default();
        config.server.static_dir = Some(file_path.to_string_lossy().to_string());
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("is not a directory"));
    }

    #[test]
    fn test_validate_rejects_unbounded_retention() {
        let mut config = Config::default();
        config.conversation.idle_timeout_secs = u64::MAX;
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("idle_timeout_secs"));

        let mut config = Config::default();
        config.context.window_hours = i64::MAX;
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("window_hours"));

        let mut config = Config::default();
        config.conversation.idle_timeout_secs = MAX_RETENTION_SECS;
        config.context.window_hours = 30 * 24;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_explicit_file_layers_over_project() {
        let temp_dir = tempdir().unwrap();
        let project_path = temp_dir.path().join(PROJECT_CONFIG_FILENAME);
        fs::write(&project_path, "[server]\nport = 7000\n\n[loadtest]\nusers = 5\n").unwrap();
        let explicit_path = temp_dir.path().join("custom.toml");
        fs::write(&explicit_path, "[loadtest]\nusers = 3\n").unwrap();

        let project = load_config_from_path(&project_path).unwrap();
        let explicit = load_config_from_path(&explicit_path).unwrap();
        let merged = merge_configs(merge_configs(Config::default(), Some(project)), Some(explicit));
        assert_eq!(merged.server.port, 7000);
        assert_eq!(merged.loadtest.users, 3);
    }

    #[test]
    fn test_find_project_config_in_ancestor() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();

        let found = find_project_config_path(&nested).expect("config should be found");
        assert_eq!(found, temp_dir.path().join(PROJECT_CONFIG_FILENAME));
    }

    #[test]
    fn test_find_project_config_stops_at_git() {
        let temp_dir = tempdir().unwrap();
        let repo = temp_dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();

        assert!(find_project_config_path(&repo).is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[loadtest]\nusers = 3\n").unwrap();
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.loadtest.users, 3);
    }
}
