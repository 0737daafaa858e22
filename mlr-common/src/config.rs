//! Configuration loading and resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument / environment variable (both arrive as [`ConfigOverrides`])
//! 2. TOML config file
//! 3. Compiled default (fallback)
//!
//! The resolved [`ServiceConfig`] is built once at startup and handed to the
//! HTTP layer by value; nothing here keeps global state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default log filter when neither RUST_LOG nor config provide one
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 5000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// On-disk TOML configuration (`mlr.toml`)
///
/// Every field is optional; missing values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Expose the /api/db administrative endpoints
    pub enable_admin: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSection {
    pub path: Option<PathBuf>,
    pub max_connections: Option<u32>,
    pub call_timeout_ms: Option<u64>,
    pub busy_timeout_ms: Option<u64>,
    /// Create schema and views at startup if missing
    pub auto_init: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    pub level: Option<String>,
}

/// Values supplied on the command line or through `MLR_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Relational store settings
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    /// Upper bound for a single stored-procedure call
    pub call_timeout: Duration,
    /// SQLite busy_timeout for lock contention
    pub busy_timeout: Duration,
    pub auto_init: bool,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub enable_admin: bool,
    pub log_level: String,
    pub database: DatabaseConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            enable_admin: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            database: DatabaseConfig {
                path: default_database_path(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
                call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
                busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
                auto_init: true,
            },
        }
    }
}

impl ServiceConfig {
    /// Merge overrides, TOML file and compiled defaults into one configuration
    pub fn resolve(overrides: ConfigOverrides, file: Option<TomlConfig>) -> Result<Self> {
        let defaults = Self::default();
        let file = file.unwrap_or_default();

        let config = Self {
            host: overrides
                .host
                .or(file.server.host)
                .unwrap_or(defaults.host),
            port: overrides
                .port
                .or(file.server.port)
                .unwrap_or(defaults.port),
            enable_admin: file.server.enable_admin.unwrap_or(defaults.enable_admin),
            log_level: overrides
                .log_level
                .or(file.logging.level)
                .unwrap_or(defaults.log_level),
            database: DatabaseConfig {
                path: overrides
                    .database
                    .or(file.database.path)
                    .unwrap_or(defaults.database.path),
                max_connections: file
                    .database
                    .max_connections
                    .unwrap_or(defaults.database.max_connections),
                call_timeout: file
                    .database
                    .call_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.database.call_timeout),
                busy_timeout: file
                    .database
                    .busy_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.database.busy_timeout),
                auto_init: file.database.auto_init.unwrap_or(defaults.database.auto_init),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("server host must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.call_timeout.is_zero() {
            return Err(Error::Config(
                "database.call_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the TOML config file
///
/// A missing file is not an error: `None` is returned so the caller falls
/// back to defaults. Runs before logging is set up (the file may carry the
/// log level), so reporting is left to the caller.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    Ok(Some(config))
}

/// Platform config file location: `<config_dir>/mlr/mlr.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("mlr").join("mlr.toml"))
        .unwrap_or_else(|| PathBuf::from("mlr.toml"))
}

/// Platform database location: `<data_local_dir>/mlr/mlr.db`
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mlr").join("mlr.db"))
        .unwrap_or_else(|| PathBuf::from("./mlr_data/mlr.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let config = ServiceConfig::resolve(ConfigOverrides::default(), None).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.database.call_timeout, Duration::from_millis(5000));
        assert!(config.database.path.ends_with("mlr.db"));
        assert!(config.enable_admin);
    }

    #[test]
    fn test_overrides_beat_file() {
        let file = TomlConfig {
            server: ServerSection {
                host: Some("0.0.0.0".to_string()),
                port: Some(8080),
                enable_admin: Some(false),
            },
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            port: Some(9000),
            ..Default::default()
        };

        let config = ServiceConfig::resolve(overrides, Some(file)).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(!config.enable_admin);
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_zero_pool_rejected() {
        let file = TomlConfig {
            database: DatabaseSection {
                max_connections: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = ServiceConfig::resolve(ConfigOverrides::default(), Some(file)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
