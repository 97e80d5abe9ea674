//! Configuration loading and management

use anyhow::{Context, Result, bail};
use notekeep_auth::DEFAULT_TOKEN_LIFETIME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Signing secret used only when dev mode is on and no secret is configured
const DEV_JWT_SECRET: &str = "notekeep-dev-secret";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl DatabaseConfig {
    /// Filesystem path of a file-backed SQLite URL, if any
    pub fn file_path(&self) -> Option<PathBuf> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path.contains(":memory:") {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret; required unless `dev_mode` is on
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Token lifetime, e.g. "7d", "12h" or a number of seconds
    #[serde(default = "default_jwt_expires_in")]
    pub jwt_expires_in: String,
    /// Allow starting without a secret, signing with a fixed development one
    #[serde(default)]
    pub dev_mode: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expires_in: default_jwt_expires_in(),
            dev_mode: false,
        }
    }
}

impl AuthConfig {
    fn configured_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Whether tokens will be signed with the built-in development secret
    pub fn uses_dev_secret(&self) -> bool {
        self.dev_mode && self.configured_secret().is_none()
    }

    /// The secret to sign tokens with
    ///
    /// Fails when no secret is configured and dev mode is off.
    pub fn signing_secret(&self) -> Result<&str> {
        match self.configured_secret() {
            Some(secret) => Ok(secret),
            None if self.dev_mode => Ok(DEV_JWT_SECRET),
            None => bail!("No JWT secret configured; set JWT_SECRET or enable dev mode"),
        }
    }
}

/// Notes listing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Upper bound for the list `limit` parameter; unbounded when unset
    #[serde(default)]
    pub max_page_size: Option<i64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

/// Values taken from the command line or environment, overriding the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_expires_in: Option<String>,
    pub dev_mode: bool,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database_url() -> String {
    "sqlite:./data/notekeep.db?mode=rwc".to_string()
}

fn default_jwt_expires_in() -> String {
    DEFAULT_TOKEN_LIFETIME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    ///
    /// Returns `None` when the file does not exist. This runs before logging
    /// is set up, so reporting which source was used is left to the caller.
    pub fn load(path: &str) -> Result<Option<Self>> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(Some(config))
    }

    /// Apply command-line and environment overrides
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.database_url {
            self.database.url = url;
        }
        if let Some(secret) = overrides.jwt_secret {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(expires_in) = overrides.jwt_expires_in {
            self.auth.jwt_expires_in = expires_in;
        }
        if overrides.dev_mode {
            self.auth.dev_mode = true;
        }
    }
}
