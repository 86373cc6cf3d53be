//! Sync Error Types
//!
//! This module defines the error type returned by the client-side sync
//! components: storage backends, the HTTP transport and configuration
//! loading.
//!
//! # Error Categories
//!
//! - Transport failures (`Http`, `Api`) - counted as failed pushes
//! - `Conflict` - the server explicitly flagged the mutation as conflicting
//! - `Unauthenticated` / `NotJson` - soft pull failures, skipped silently
//! - `Storage` / `Database` / `Io` - local persistence failures
//!
//! # Usage
//!
//! ```rust
//! use crmsync::shared::error::SyncError;
//!
//! let error = SyncError::conflict("record was modified on the server");
//! assert!(error.is_conflict());
//! ```
use thiserror::Error;

use crate::shared::config::ConfigError;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while queueing, persisting or delivering mutations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP client error (connection refused, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response that carries no conflict marker
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message taken from the error body when present
        message: String,
    },

    /// Push rejected with an explicit conflict marker
    #[error("Conflict: {message}")]
    Conflict {
        /// Server-supplied explanation
        message: String,
    },

    /// Server answered 401
    #[error("Not authenticated")]
    Unauthenticated,

    /// Server answered with something other than JSON (usually a login page)
    #[error("Expected a JSON response, got '{content_type}'")]
    NotJson {
        /// Content type reported by the server
        content_type: String,
    },

    /// Local key-value storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite failure in desktop mode
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Whether the server explicitly flagged a conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthenticated => Some(401),
            _ => None,
        }
    }
}
