//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set")
}

pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

pub fn db_max_connections() -> anyhow::Result<u32> {
    Ok(parse_var("DB_MAX_CONNECTIONS", std::env::var("DB_MAX_CONNECTIONS").ok(), DEFAULT_DB_MAX_CONNECTIONS)?.max(1))
}

pub fn request_timeout() -> anyhow::Result<Duration> {
    let secs = parse_var(
        "REQUEST_TIMEOUT_SECS",
        std::env::var("REQUEST_TIMEOUT_SECS").ok(),
        DEFAULT_REQUEST_TIMEOUT_SECS,
    )?;
    Ok(Duration::from_secs(secs.max(1)))
}

/// Parses an optional raw value, falling back to `default` when unset or blank.
pub fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, v, e)),
    }
}

/// Everything the API server reads at start-up.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: database_url()?,
            bind_addr: bind_addr(),
            db_max_connections: db_max_connections()?,
            request_timeout: request_timeout()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_defaults_and_errors() {
        assert_eq!(parse_var::<u32>("X", None, 5).unwrap(), 5);
        assert_eq!(parse_var::<u32>("X", Some("  ".into()), 5).unwrap(), 5);
        assert_eq!(parse_var::<u32>("X", Some("12".into()), 5).unwrap(), 12);

        let err = parse_var::<u32>("DB_MAX_CONNECTIONS", Some("many".into()), 5).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }
}
