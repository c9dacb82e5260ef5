//! Configuration loading
//!
//! Settings are resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive together as [`ConfigOverrides`] (the binary's
//! argument parser reads both). A missing TOML file is never fatal.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "SONGBOOK_CONFIG";

/// Optional settings read from the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Upper bound for a single storage call
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files (optional, logs to stderr if not specified)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults used when no other tier supplies a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub query_timeout_ms: u64,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: default_data_dir().join("songbook.db"),
            query_timeout_ms: 5000,
            log_level: default_log_level(),
        }
    }
}

/// Values from the command line or environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub query_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub query_timeout_ms: u64,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Merge the tiers; the first tier that has a value wins
    pub fn resolve(overrides: ConfigOverrides, toml: Option<TomlConfig>) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        let toml = toml.unwrap_or_default();

        Self {
            host: overrides.host.or(toml.host).unwrap_or(defaults.host),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            database_path: overrides
                .database_path
                .or(toml.database_path)
                .unwrap_or(defaults.database_path),
            query_timeout_ms: overrides
                .query_timeout_ms
                .or(toml.query_timeout_ms)
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.query_timeout_ms),
            logging: LoggingConfig {
                level: overrides.log_level.unwrap_or(toml.logging.level),
                directory: overrides.log_dir.or(toml.logging.directory),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the TOML config file if it exists
///
/// A missing file yields `Ok(None)` and a warning. A file that exists but
/// cannot be read or parsed is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Config file location: explicit path, then `SONGBOOK_CONFIG`, then the
/// per-user config directory
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("songbook").join("config.toml"))
}

/// OS-dependent data directory for the database
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songbook"))
        .unwrap_or_else(|| PathBuf::from("./songbook_data"))
}
