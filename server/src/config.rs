//! Environment-driven server configuration.

use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8082;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {var}={value:?} is not a valid number")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// Whole request, inbound and outbound.
    pub request: Duration,
    /// Until the peer user service has sent its response headers.
    pub response_headers: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(60),
            response_headers: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub redis_url: String,
    pub user_service_url: String,
    pub timeouts: Timeouts,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.is_empty());
        let required = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));
        let port = |var: &'static str, default: u16| match get(var) {
            None => Ok(default),
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber { var, value }),
        };
        let host = |var: &str| get(var).unwrap_or_else(|| "127.0.0.1".to_string());

        let database = DatabaseConfig {
            host: host("MYSQL_HOST"),
            port: port("MYSQL_PORT", 3306)?,
            user: required("MYSQL_USER")?,
            password: required("MYSQL_PASSWORD")?,
            database: required("MYSQL_DATABASE")?,
            max_connections: 10,
            idle_timeout: Duration::from_secs(90),
        };

        Ok(Self {
            port: port("PORT", DEFAULT_PORT)?,
            database,
            redis_url: format!("redis://{}:{}/", host("REDIS_HOST"), port("REDIS_PORT", 6379)?),
            user_service_url: format!("http://{}:{}", host("USER_HOST"), port("USER_PORT", 8080)?),
            timeouts: Timeouts::default(),
        })
    }
}
