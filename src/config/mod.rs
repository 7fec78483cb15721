//! Configuration module for Pulp Migrate Check
//!
//! Handles loading and parsing of YAML configuration files with support for
//! environment variable expansion and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pulp: PulpConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
    pub legacy: LegacyConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        ConfigLoader::parse(content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_http_url(&self.pulp.host) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid Pulp host '{}': must start with http:// or https://",
                self.pulp.host
            )));
        }

        if self.pulp.username.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Pulp username cannot be empty".into(),
            ));
        }

        if !self.pulp.api_root.starts_with('/') || !self.pulp.api_root.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "Invalid API root '{}': must start and end with '/'",
                self.pulp.api_root
            )));
        }

        if self.tasks.poll_interval_millis == 0 {
            return Err(ConfigError::ValidationError(
                "Task poll interval must be greater than zero".into(),
            ));
        }

        if self.tasks.timeout() < self.tasks.poll_interval() {
            return Err(ConfigError::ValidationError(format!(
                "Task timeout ({}s) is shorter than the poll interval ({}ms)",
                self.tasks.timeout_seconds, self.tasks.poll_interval_millis
            )));
        }

        if crate::plugins::content_types(&self.legacy.plugin).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Unsupported plugin '{}': must be one of {}",
                self.legacy.plugin,
                crate::plugins::SUPPORTED.join(", ")
            )));
        }

        if !crate::plugins::is_verifiable(&self.legacy.plugin) {
            return Err(ConfigError::ValidationError(format!(
                "Plugin '{}' cannot be verified: only {} repositories are checked",
                self.legacy.plugin,
                crate::plugins::VERIFIABLE.join(", ")
            )));
        }

        Ok(())
    }
}

/// Pulp 3 API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_api_root")]
    pub api_root: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl PulpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for PulpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: default_username(),
            password: default_password(),
            api_root: default_api_root(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "http://localhost:24817".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_api_root() -> String {
    "/pulp/api/v3/".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Task polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_millis: u64,
    #[serde(default = "default_task_timeout")]
    pub timeout_seconds: u64,
}

impl TaskConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            poll_interval_millis: default_poll_interval(),
            timeout_seconds: default_task_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_task_timeout() -> u64 {
    1800 // 30 minutes
}

/// Legacy (Pulp 2) oracle configuration
///
/// `snapshot_dir` points at a `mongoexport` dump of the Pulp 2 database
/// containing `repos.json` and `repo_content_units.json`.
///
/// # Example
///
/// ```yaml
/// legacy:
///   snapshot_dir: "${PULP2_EXPORT_DIR:-/var/lib/pulp2-export}"
///   plugin: "iso"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyConfig {
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_plugin")]
    pub plugin: String,
}

fn default_plugin() -> String {
    "iso".to_string()
}
