//! Configuration types and loading for the tracker.
//!
//! The main entry point is [`TrackerConfig`]. It is assembled with [`load_config`]
//! from three layers, later ones overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. an optional TOML or YAML file (chosen by extension),
//! 3. `TRACKER_*` environment variables, nested with `__`
//!    (e.g. `TRACKER_SERVER__BIND=0.0.0.0:8080`).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "TRACKER_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or had the wrong shape.
    #[error("failed to load configuration: {0}")]
    ParseError(Box<figment::Error>),

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::ParseError(Box::new(err))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// HTTP server section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Database section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tracker.db")
}

/// Issue list paging section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Requested page sizes above this are clamped.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins over it.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Session section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of sessions issued by `trackerd session create`.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> u32 {
    720
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The complete tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl TrackerConfig {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.pagination.default_page_size == 0 {
            return Err(invalid("pagination.default_page_size", "must be greater than 0"));
        }
        if self.pagination.max_page_size == 0 {
            return Err(invalid("pagination.max_page_size", "must be greater than 0"));
        }
        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(invalid(
                "pagination.default_page_size",
                format!(
                    "{} exceeds max_page_size {}",
                    self.pagination.default_page_size, self.pagination.max_page_size
                ),
            ));
        }
        if self.session.ttl_hours == 0 {
            return Err(invalid("session.ttl_hours", "must be greater than 0"));
        }
        Ok(())
    }

    /// The parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| invalid("server.bind", format!("{e}")))
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Builds the layered [`Figment`] without extracting it.
///
/// Files ending in `.yaml`/`.yml` are read as YAML, anything else as TOML.
pub fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(TrackerConfig::default()));
    if let Some(path) = path {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        figment = if is_yaml {
            figment.merge(Yaml::file(path))
        } else {
            figment.merge(Toml::file(path))
        };
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads and validates the configuration.
///
/// A `path` that was asked for explicitly must exist.
pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
    }
    let config: TrackerConfig = figment(path).extract()?;
    config.validate()?;
    Ok(config)
}
