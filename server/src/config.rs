//! Server configuration, loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::num::NonZeroUsize;

use system::RetentionPolicy;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

const VARS: [&str; 4] = ["HOST", "PORT", "HISTORY_LIMIT", "OUTBOX_CAPACITY"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Stroke history kept per room.
    pub retention: RetentionPolicy,
    /// Outbound events queued per connection before new ones are dropped.
    pub outbox_capacity: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT: {0}")]
    InvalidPort(String),

    #[error("Invalid HISTORY_LIMIT: {0}")]
    InvalidHistoryLimit(String),

    #[error("Invalid OUTBOX_CAPACITY: {0}")]
    InvalidOutboxCapacity(String),

    #[error("{0} is not valid unicode")]
    NotUnicode(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&collect_vars(env::vars_os())?)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let host = vars
            .get("HOST")
            .cloned()
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match vars.get("PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| {
                ConfigError::InvalidPort(format!("expected a port number, got '{}': {}", value, e))
            })?,
            None => DEFAULT_PORT,
        };

        let retention = match vars.get("HISTORY_LIMIT") {
            Some(value) => {
                let limit = value.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidHistoryLimit(format!(
                        "expected a positive integer, got '{}': {}",
                        value, e
                    ))
                })?;
                let limit = NonZeroUsize::new(limit).ok_or_else(|| {
                    ConfigError::InvalidHistoryLimit(
                        "must be positive; leave unset for unbounded history".to_string(),
                    )
                })?;
                RetentionPolicy::Capped(limit)
            }
            None => RetentionPolicy::Unbounded,
        };

        let outbox_capacity = match vars.get("OUTBOX_CAPACITY") {
            Some(value) => {
                let capacity = value.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidOutboxCapacity(format!(
                        "expected a positive integer, got '{}': {}",
                        value, e
                    ))
                })?;
                if capacity == 0 {
                    return Err(ConfigError::InvalidOutboxCapacity(
                        "must be positive".to_string(),
                    ));
                }
                capacity
            }
            None => DEFAULT_OUTBOX_CAPACITY,
        };

        Ok(Self {
            host,
            port,
            retention,
            outbox_capacity,
        })
    }
}

/// Keeps the variables that are valid unicode. Only the ones read by
/// [`Config::from_vars`] are required to be.
fn collect_vars<I>(vars: I) -> Result<HashMap<String, String>, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut collected = HashMap::new();
    for (key, value) in vars {
        let key = match key.into_string() {
            Ok(key) => key,
            Err(_) => continue,
        };
        match value.into_string() {
            Ok(value) => {
                collected.insert(key, value);
            }
            Err(_) if VARS.contains(&key.as_str()) => return Err(ConfigError::NotUnicode(key)),
            Err(_) => {}
        }
    }
    Ok(collected)
}
