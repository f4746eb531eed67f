//! Bridge configuration primitives.
//!
//! The bridge reads one TOML file given by `--config`. Its
//! `[shared]` table maps to [`SharedConfig`]; the bridge-specific tables live
//! in `hapad_bridge::config` and are read through the same [`ConfigLoader`].
//! Without `--config` the bridge runs on built-in defaults; a path that does
//! not exist is an error.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hapad_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct BridgeFile {
//!     shared: SharedConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = BridgeFile::load(Path::new("bridge.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Why a bridge config file was rejected.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the `--config` path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// Unreadable file, bad TOML, or an unknown key in a strict table.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value outside its range, e.g. a zero divisor or negative gain.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// `log_level` values accepted in `[shared]`, lowercase in TOML.
///
/// `-v` on the command line overrides this with `debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, per-tick report tracing.
    Trace,
    /// Periodic cycle statistics and lock transitions.
    Debug,
    /// Lifecycle messages.
    #[default]
    Info,
    /// Timing overruns and dropped keys.
    Warn,
    /// Fatal diagnostics only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// The `[shared]` table: log verbosity and the name the bridge logs under.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "hapad-bridge"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Tracing level of the bridge's log output.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name attached to the startup banner, `hapad-bridge` unless set.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "hapad-bridge".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Check the shared table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// TOML loading for `BridgeConfig` and its sections.
///
/// Only file access and syntax are checked here; range checks belong to the
/// loaded type's own `validate`.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`. A missing file is [`ConfigError::FileNotFound`].
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse an in-memory TOML document.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
