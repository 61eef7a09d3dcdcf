//! Flight log configuration
//!
//! Shared, read-only settings handed to whichever flight-stack logger the
//! gate ends up constructing. The gate itself never inspects them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for flight log endpoints
///
/// # Example
/// ```toml
/// logs_dir = "/var/lib/mavlog"
/// mode = "while-armed"
/// max_log_files = 20
/// fcu_id = 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory that receives log files
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    /// When logging is active
    #[serde(default)]
    pub mode: LogMode,
    /// Maximum number of log files kept in `logs_dir` (0 = unlimited)
    #[serde(default)]
    pub max_log_files: usize,
    /// System id of the flight controller, if known in advance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcu_id: Option<u8>,
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            mode: LogMode::default(),
            max_log_files: 0,
            fcu_id: None,
        }
    }
}

impl LogConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Logging policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogMode {
    /// Log for the whole connection
    #[default]
    Always,
    /// Log only while the vehicle reports itself armed
    WhileArmed,
    /// Consume packets without writing anything
    Disabled,
}

impl std::fmt::Display for LogMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogMode::Always => "always",
            LogMode::WhileArmed => "while-armed",
            LogMode::Disabled => "disabled",
        };
        f.write_str(s)
    }
}
