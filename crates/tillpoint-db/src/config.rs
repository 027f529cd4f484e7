//! Engine configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DbConfig;

/// Sale engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size (default: 5)
    pub max_connections: u32,

    /// How long a writer waits on a competing unit of work, in milliseconds
    pub busy_timeout_ms: u64,

    /// Rows returned in the top-products statistic
    pub top_products: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_path: PathBuf::from("./tillpoint.db"),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            top_products: 10,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                        | Default           |
    /// |---------------------------------|-------------------|
    /// | `TILLPOINT_DB_PATH`             | `./tillpoint.db`  |
    /// | `TILLPOINT_DB_MAX_CONNECTIONS`  | `5`               |
    /// | `TILLPOINT_DB_BUSY_TIMEOUT_MS`  | `5000`            |
    /// | `TILLPOINT_TOP_PRODUCTS`        | `10`              |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            database_path: lookup("TILLPOINT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "TILLPOINT_DB_MAX_CONNECTIONS", defaults.max_connections)?,

            busy_timeout_ms: parse_or(&lookup, "TILLPOINT_DB_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms)?,

            top_products: parse_or(&lookup, "TILLPOINT_TOP_PRODUCTS", defaults.top_products)?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TILLPOINT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool configuration for this engine.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
