//! Application configuration loaded from environment variables.

use domain::StatusError;
use fulfillment::{DirectEditPolicy, ParsePolicyError, PropagationPolicy, Settings};
use thiserror::Error;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PROPAGATE_STAGES: {0}")]
    PropagateStages(#[from] StatusError),

    #[error("Invalid DIRECT_EDIT_POLICY: {0}")]
    DirectEditPolicy(#[from] ParsePolicyError),

    #[error("Invalid LOG_FORMAT '{0}' (expected text or json)")]
    LogFormat(String),
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL URL; unset runs on the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `PROPAGATE_STAGES`: `all` or a comma-separated stage list (default: `all`)
/// - `DIRECT_EDIT_POLICY`: `parent-wins` or `require-convergence` (default: `parent-wins`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub settings: Settings,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT") {
            None => defaults.log_format,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "text" | "" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::LogFormat(value)),
            },
        };

        let propagation = match lookup("PROPAGATE_STAGES") {
            Some(value) => value.parse::<PropagationPolicy>()?,
            None => defaults.settings.propagation,
        };
        let direct_edit = match lookup("DIRECT_EDIT_POLICY") {
            Some(value) => value.parse::<DirectEditPolicy>()?,
            None => defaults.settings.direct_edit,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            settings: Settings {
                propagation,
                direct_edit,
            },
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            database_max_connections: 5,
            settings: Settings::default(),
        }
    }
}
