//! Configuration management for the phonebook service.
//!
//! Loads configuration from environment variables (after `.env`, if present)
//! with defaults for everything but the database URL.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default static asset root.
pub const DEFAULT_ASSET_DIR: &str = "build";

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("{var} has invalid value `{value}`: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `PostgreSQL` configuration
    pub database: DatabaseConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Directory served as static assets
    pub asset_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DATABASE_URL` | required |
    /// | `DATABASE_MAX_CONNECTIONS` | `5` |
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `3001` |
    /// | `ASSET_DIR` | `build` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DATABASE_URL` is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
                asset_dir: get("ASSET_DIR")
                    .map_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR), PathBuf::from),
            },
        })
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// The connection URL with any password replaced by `***`, for logging.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((userinfo, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => self.url.clone(),
        }
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        }
    }
}
