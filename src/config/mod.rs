use std::env;
use std::time::Duration;

use thiserror::Error;

pub mod cors;
pub mod timeout;

pub use cors::create_cors_layer;
pub use timeout::RequestDeadlineLayer;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DATABASE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PING_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Outer bound for a whole request.
    pub request_timeout: Duration,
    /// Bound for a single storage call, never longer than `request_timeout`.
    pub database_timeout: Duration,
    pub ping_timeout: Duration,
    pub run_migrations: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let request_timeout = parse_secs(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let mut database_timeout =
            parse_secs(&lookup, "DATABASE_TIMEOUT_SECS", DEFAULT_DATABASE_TIMEOUT_SECS)?;
        let ping_timeout = parse_secs(&lookup, "DATABASE_PING_TIMEOUT_SECS", DEFAULT_PING_TIMEOUT_SECS)?;
        let run_migrations = parse_var(&lookup, "RUN_MIGRATIONS", true)?;

        if database_timeout > request_timeout {
            tracing::warn!(
                database_timeout_secs = database_timeout.as_secs(),
                request_timeout_secs = request_timeout.as_secs(),
                "Config: database timeout exceeds request timeout, clamping"
            );
            database_timeout = request_timeout;
        }

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database_url,
            port,
            max_connections,
            request_timeout,
            database_timeout,
            ping_timeout,
            run_migrations,
            allowed_origins,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_var(lookup, var, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: secs.to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
