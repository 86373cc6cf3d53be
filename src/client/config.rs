//! Client configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, the TOML file named
//! by `CRMSYNC_CONFIG`, then individual `CRMSYNC_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::shared::config::{ConfigError, StorageBackend, SyncConfig, SyncConfigBuilder};

pub const ENV_CONFIG_PATH: &str = "CRMSYNC_CONFIG";
pub const ENV_SERVER_URL: &str = "CRMSYNC_SERVER_URL";
pub const ENV_TOKEN: &str = "CRMSYNC_TOKEN";
pub const ENV_SYNC_INTERVAL: &str = "CRMSYNC_SYNC_INTERVAL_SECS";
pub const ENV_STARTUP_DELAY: &str = "CRMSYNC_STARTUP_DELAY_SECS";
pub const ENV_STATUS_POLL: &str = "CRMSYNC_STATUS_POLL_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "CRMSYNC_REQUEST_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "CRMSYNC_MAX_RETRIES";
pub const ENV_AUTO_SYNC: &str = "CRMSYNC_AUTO_SYNC";
pub const ENV_STORAGE: &str = "CRMSYNC_STORAGE";
pub const ENV_DATA_DIR: &str = "CRMSYNC_DATA_DIR";

/// On-disk configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub api_token: Option<String>,
    pub sync_interval_secs: Option<u64>,
    pub startup_delay_secs: Option<u64>,
    pub status_poll_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub auto_sync: Option<bool>,
    pub storage: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn apply(self, mut builder: SyncConfigBuilder) -> Result<SyncConfigBuilder, ConfigError> {
        if let Some(url) = self.server_url {
            builder = builder.server_url(url);
        }
        if let Some(token) = self.api_token {
            builder = builder.api_token(token);
        }
        if let Some(secs) = self.sync_interval_secs {
            builder = builder.sync_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.startup_delay_secs {
            builder = builder.startup_delay(Duration::from_secs(secs));
        }
        if let Some(secs) = self.status_poll_secs {
            builder = builder.status_poll_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if self.max_retries.is_some() {
            builder = builder.max_retries(self.max_retries);
        }
        if let Some(enabled) = self.auto_sync {
            builder = builder.auto_sync(enabled);
        }
        if let Some(storage) = self.storage {
            builder = builder.storage(storage.parse()?);
        }
        if let Some(dir) = self.data_dir {
            builder = builder.data_dir(dir);
        }
        Ok(builder)
    }
}

/// Load configuration from the process environment
pub fn load() -> Result<SyncConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` in place of the environment
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<SyncConfig, ConfigError> {
    let mut builder = SyncConfig::builder();

    if let Some(path) = lookup(ENV_CONFIG_PATH) {
        builder = FileConfig::read(Path::new(&path))?.apply(builder)?;
    }

    apply_env(builder, &lookup)?.build()
}

fn apply_env(
    mut builder: SyncConfigBuilder,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<SyncConfigBuilder, ConfigError> {
    if let Some(url) = lookup(ENV_SERVER_URL) {
        builder = builder.server_url(url);
    }
    if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
        builder = builder.api_token(token);
    }
    if let Some(secs) = lookup(ENV_SYNC_INTERVAL) {
        builder = builder.sync_interval(parse_secs(ENV_SYNC_INTERVAL, &secs)?);
    }
    if let Some(secs) = lookup(ENV_STARTUP_DELAY) {
        builder = builder.startup_delay(parse_secs(ENV_STARTUP_DELAY, &secs)?);
    }
    if let Some(secs) = lookup(ENV_STATUS_POLL) {
        builder = builder.status_poll_interval(parse_secs(ENV_STATUS_POLL, &secs)?);
    }
    if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
        builder = builder.request_timeout(parse_secs(ENV_REQUEST_TIMEOUT, &secs)?);
    }
    if let Some(raw) = lookup(ENV_MAX_RETRIES) {
        let max_retries = match raw.trim() {
            "" | "none" | "unlimited" => None,
            value => Some(
                value
                    .parse::<u32>()
                    .map_err(|_| ConfigError::invalid(ENV_MAX_RETRIES, value))?,
            ),
        };
        builder = builder.max_retries(max_retries);
    }
    if let Some(raw) = lookup(ENV_AUTO_SYNC) {
        builder = builder.auto_sync(parse_bool(ENV_AUTO_SYNC, &raw)?);
    }
    if let Some(raw) = lookup(ENV_STORAGE) {
        builder = builder.storage(raw.parse::<StorageBackend>()?);
    }
    if let Some(dir) = lookup(ENV_DATA_DIR) {
        builder = builder.data_dir(dir);
    }
    Ok(builder)
}

fn parse_secs(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::invalid(key, raw))
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw)),
    }
}
