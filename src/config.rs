//! Server configuration from environment variables.
//!
//! | Variable                 | Default                              |
//! |--------------------------|--------------------------------------|
//! | `HOST`                   | `0.0.0.0`                            |
//! | `PORT`                   | `8080`                               |
//! | `DATA_DIR`               | `data`                               |
//! | `CATALOG_URL`            | `https://shikimori.one/api/graphql`  |
//! | `CATALOG_USER_AGENT`     | `anime-tournament-web`               |
//! | `RATE_LIMIT_BACKOFF_MS`  | `2000`                               |
//! | `RATE_LIMIT_MAX_RETRIES` | unset (retry until not rate limited) |

use crate::catalog::{RetryPolicy, DEFAULT_CATALOG_URL};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number (got '{value}')")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub catalog_url: String,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: "anime-tournament-web".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; unset or empty variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = parse(get("PORT"), "PORT")? {
            config.port = port;
        }
        if let Some(dir) = get("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("CATALOG_URL") {
            config.catalog_url = url;
        }
        if let Some(agent) = get("CATALOG_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(ms) = parse::<u64>(get("RATE_LIMIT_BACKOFF_MS"), "RATE_LIMIT_BACKOFF_MS")? {
            config.retry.backoff = Duration::from_millis(ms);
        }
        config.retry.max_retries = parse(get("RATE_LIMIT_MAX_RETRIES"), "RATE_LIMIT_MAX_RETRIES")?;
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(value: Option<String>, name: &'static str) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value: v })
        })
        .transpose()
}
