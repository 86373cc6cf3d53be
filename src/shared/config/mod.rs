//! Sync configuration
//!
//! Static configuration read once when the sync subsystem starts: where the
//! server lives, how often to sync, and which local storage backend to use.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the queue and pull cursor are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process memory only; nothing survives a restart
    Memory,
    /// One JSON file per key under the data directory
    #[default]
    File,
    /// SQLite database file under the data directory (desktop mode)
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" | "desktop" => Ok(Self::Sqlite),
            _ => Err(ConfigError::invalid("storage", value)),
        }
    }
}

/// Sync subsystem configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Base URL of the sync server
    pub server_url: String,
    /// Bearer token sent with push and pull requests
    pub api_token: Option<String>,
    /// Interval between automatic drain passes
    pub sync_interval: Duration,
    /// Delay before the first automatic drain pass
    pub startup_delay: Duration,
    /// Interval at which the status surface refreshes
    pub status_poll_interval: Duration,
    /// Per-request timeout for push and pull calls
    pub request_timeout: Duration,
    /// Failed attempts after which an item is evicted; `None` keeps items forever
    pub max_retries: Option<u32>,
    /// Whether the auto-sync coordinator runs at all
    pub auto_sync: bool,
    /// Local storage backend
    pub storage: StorageBackend,
    /// Directory for file and SQLite storage
    pub data_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_token: None,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            startup_delay: DEFAULT_STARTUP_DELAY,
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: None,
            auto_sync: true,
            storage: StorageBackend::default(),
            data_dir: None,
        }
    }
}

impl SyncConfig {
    /// Create a new SyncConfigBuilder
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        for (key, value) in [
            ("sync_interval", self.sync_interval),
            ("status_poll_interval", self.status_poll_interval),
            ("request_timeout", self.request_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::invalid(key, "0"));
            }
        }
        if self.max_retries == Some(0) {
            return Err(ConfigError::invalid("max_retries", "0"));
        }
        Ok(())
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }

    /// Directory used by the file and SQLite backends.
    ///
    /// Falls back to the platform data directory, then the temp directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
            path.push("crmsync");
            path
        })
    }
}

/// Builder for SyncConfig
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    /// Set the bearer token
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    /// Set the automatic sync interval
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.config.sync_interval = interval;
        self
    }

    /// Set the delay before the first automatic sync
    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.config.startup_delay = delay;
        self
    }

    /// Set the status surface refresh interval
    pub fn status_poll_interval(mut self, interval: Duration) -> Self {
        self.config.status_poll_interval = interval;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set or clear the retry limit
    pub fn max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Enable or disable the auto-sync coordinator
    pub fn auto_sync(mut self, enabled: bool) -> Self {
        self.config.auto_sync = enabled;
        self
    }

    /// Set the storage backend
    pub fn storage(mut self, storage: StorageBackend) -> Self {
        self.config.storage = storage;
        self
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
        }
    }
}
