//! Integration tests for environment configuration.

use anime_tournament_web::config::{Config, ConfigError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_when_unset() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.port, 8080);
    assert_eq!(config.retry.backoff, Duration::from_millis(2000));
    assert_eq!(config.retry.max_retries, None);
}

#[test]
fn overrides_from_variables() {
    let config = config_from(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9000"),
        ("DATA_DIR", "/tmp/tournament"),
        ("CATALOG_URL", "http://localhost:4000/graphql"),
        ("RATE_LIMIT_BACKOFF_MS", "250"),
        ("RATE_LIMIT_MAX_RETRIES", "5"),
    ])
    .unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9000);
    assert_eq!(config.data_dir, PathBuf::from("/tmp/tournament"));
    assert_eq!(config.catalog_url, "http://localhost:4000/graphql");
    assert_eq!(config.retry.backoff, Duration::from_millis(250));
    assert_eq!(config.retry.max_retries, Some(5));
}

#[test]
fn empty_values_keep_defaults() {
    let config = config_from(&[("PORT", ""), ("HOST", "  ")]).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "0.0.0.0");
}

#[test]
fn bad_number_is_an_error() {
    assert_eq!(
        config_from(&[("PORT", "eighty")]),
        Err(ConfigError::InvalidNumber {
            name: "PORT",
            value: "eighty".to_string()
        })
    );
}
