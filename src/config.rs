//! Runtime configuration read from the environment.
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file via `dotenvy`. [`AppConfig::from_lookup`] accepts any lookup
//! function so tests never touch the real environment.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "LEAVEFLOW_DATABASE_URL";
/// Environment variable holding the pool size.
pub const MAX_CONNECTIONS_VAR: &str = "LEAVEFLOW_DB_MAX_CONNECTIONS";
/// Environment variable holding the connection timeout in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "LEAVEFLOW_DB_CONNECT_TIMEOUT_SECS";
/// Environment variable holding the default log filter.
pub const LOG_LEVEL_VAR: &str = "LEAVEFLOW_LOG_LEVEL";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required configuration variable {0}")]
    Missing(&'static str),

    /// A variable could not be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Parse failure description.
        reason: String,
    },
}

/// Connection settings for the `PostgreSQL` adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Time to wait for a pooled connection.
    pub connect_timeout: Duration,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Persistence settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing `.env` file is normal in production.
        let _dotenv = dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = read(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let max_connections = parse_or(
            MAX_CONNECTIONS_VAR,
            read(MAX_CONNECTIONS_VAR),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: MAX_CONNECTIONS_VAR,
                value: "0".to_owned(),
                reason: "pool size must be positive".to_owned(),
            });
        }
        let timeout_secs = parse_or(
            CONNECT_TIMEOUT_VAR,
            read(CONNECT_TIMEOUT_VAR),
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        let log_level = read(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        Ok(Self {
            store: StoreConfig {
                database_url,
                max_connections,
                connect_timeout: Duration::from_secs(timeout_secs),
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
            value,
        })
    })
}
