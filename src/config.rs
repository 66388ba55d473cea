//! Runtime configuration read from the environment (and `.env`)

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use rust_decimal_macros::dec;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STARTING_BALANCE: Decimal = dec!(100000.00);
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Cash credited to every new profile
    pub starting_balance: Decimal,
    pub session_ttl_hours: i64,
    /// Admin API is disabled when unset
    pub admin_api_key: Option<String>,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            starting_balance: parse_var("STARTING_BALANCE", DEFAULT_STARTING_BALANCE)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            admin_api_key: env::var("ADMIN_API_KEY").ok().filter(|key| !key.trim().is_empty()),
            secure_cookies: parse_var("SECURE_COOKIES", false)?,
        })
    }

    /// Configuration for tests and tools that bring their own connection
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            starting_balance: DEFAULT_STARTING_BALANCE,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            admin_api_key: None,
            secure_cookies: false,
        }
    }
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(key, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
