//! Server configuration, read from the process environment (and `.env`).

use crate::auth::Credentials;
use crate::error::{QueryError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub credentials: Credentials,
    /// Optional JSON catalog replacing the builtin tables
    pub catalog_path: Option<PathBuf>,
    pub read_timeout: Duration,
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            credentials: Credentials::default(),
            catalog_path: None,
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load `.env` if present, then read `MQE_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let username = lookup("MQE_USERNAME").unwrap_or(defaults.credentials.username);
        let password = lookup("MQE_PASSWORD").unwrap_or(defaults.credentials.password);
        let read_timeout_secs =
            parse_var(&lookup, "MQE_READ_TIMEOUT_SECS")?.unwrap_or(DEFAULT_READ_TIMEOUT_SECS);

        Ok(Self {
            bind_addr: lookup("MQE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            credentials: Credentials::new(username, password),
            catalog_path: lookup("MQE_CATALOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            read_timeout: Duration::from_secs(read_timeout_secs),
            max_request_bytes: parse_var(&lookup, "MQE_MAX_REQUEST_BYTES")?
                .unwrap_or(defaults.max_request_bytes),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| QueryError::Config(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(None),
    }
}
