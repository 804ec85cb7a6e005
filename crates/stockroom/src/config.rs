//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stockroom_auth::{MAX_TOKEN_EXPIRY_HOURS, MIN_TOKEN_EXPIRY_HOURS};
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub items: ItemsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// File the configuration was read from, `None` when defaults were used
    #[serde(skip)]
    pub source: Option<String>,
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
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// sqlx connection URL, creating the file if it does not exist
    pub fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,
    /// Token lifetime; tokens never expire when unset
    #[serde(default)]
    pub token_expiry_hours: Option<i64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            enabled: default_auth_enabled(),
            token_expiry_hours: None,
        }
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == default_jwt_secret()
    }

    /// Token lifetime clamped to the range the token issuer supports.
    /// Logs a warning if the configured value was adjusted.
    pub fn validated_token_expiry_hours(&self) -> Option<i64> {
        let hours = self.token_expiry_hours?;
        if hours < MIN_TOKEN_EXPIRY_HOURS {
            warn!(
                "token_expiry_hours {} is below minimum {}, using minimum",
                hours, MIN_TOKEN_EXPIRY_HOURS
            );
            Some(MIN_TOKEN_EXPIRY_HOURS)
        } else if hours > MAX_TOKEN_EXPIRY_HOURS {
            warn!(
                "token_expiry_hours {} exceeds maximum {}, using maximum",
                hours, MAX_TOKEN_EXPIRY_HOURS
            );
            Some(MAX_TOKEN_EXPIRY_HOURS)
        } else {
            Some(hours)
        }
    }
}

/// Item route behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemsConfig {
    /// Restrict name search to the caller's own items
    #[serde(default)]
    pub scoped_search: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
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

/// Prometheus metrics configuration
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

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./data/stockroom.db".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_auth_enabled() -> bool {
    true
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
    /// Load configuration from a file, falling back to defaults when it is missing
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.source = Some(path.to_string());
        Ok(config)
    }

    /// Log warnings for settings that are unsafe outside development
    pub fn warn_insecure(&self) {
        if self.auth.enabled && self.auth.uses_default_secret() {
            warn!("auth.jwt_secret is the built-in default; set a real secret before deploying");
        }
        if !self.auth.enabled {
            warn!("auth.enabled = false: all items are shared and unauthenticated");
        }
    }
}
