/**
 * Server Configuration
 *
 * Loaded from environment variables (a `.env` file is read first by the
 * entry point):
 *
 * - `SERVER_PORT` - listen port, default 3000
 * - `CRMSYNC_SERVER_TOKENS` - comma-separated bearer tokens; unset or empty
 *   disables authentication
 */

use std::collections::HashSet;

use crate::shared::config::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;

/// Sync server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub tokens: HashSet<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tokens: HashSet::new(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("SERVER_PORT", raw))?,
            None => DEFAULT_PORT,
        };

        let tokens = lookup("CRMSYNC_SERVER_TOKENS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { port, tokens })
    }

    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }
}
