//! Configuration loading from the real process environment

use std::io::Write;
use std::time::Duration;

use crmsync::client::config::{
    self, ENV_CONFIG_PATH, ENV_MAX_RETRIES, ENV_SERVER_URL, ENV_STORAGE, ENV_SYNC_INTERVAL,
};
use crmsync::shared::StorageBackend;
use pretty_assertions::assert_eq;
use serial_test::serial;

const KEYS: [&str; 5] = [
    ENV_CONFIG_PATH,
    ENV_SERVER_URL,
    ENV_STORAGE,
    ENV_SYNC_INTERVAL,
    ENV_MAX_RETRIES,
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_defaults_without_environment() {
    clear_env();

    let config = config::load().unwrap();
    assert_eq!(config.sync_interval, Duration::from_secs(30));
    assert_eq!(config.max_retries, None);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server_url = \"http://crm.internal:8080\"").unwrap();
    writeln!(file, "sync_interval_secs = 120").unwrap();
    writeln!(file, "storage = \"file\"").unwrap();

    std::env::set_var(ENV_CONFIG_PATH, file.path());
    std::env::set_var(ENV_STORAGE, "desktop");
    std::env::set_var(ENV_MAX_RETRIES, "4");

    let config = config::load();
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.server_url, "http://crm.internal:8080");
    assert_eq!(config.sync_interval, Duration::from_secs(120));
    assert_eq!(config.storage, StorageBackend::Sqlite);
    assert_eq!(config.max_retries, Some(4));
}

#[test]
#[serial]
fn test_invalid_environment_value_is_rejected() {
    clear_env();
    std::env::set_var(ENV_SYNC_INTERVAL, "soon");

    let result = config::load();
    clear_env();

    assert!(result.is_err());
}
