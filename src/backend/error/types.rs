/**
 * Backend Error Types
 *
 * Errors returned by the sync server's handlers and middleware. Every
 * variant maps to one HTTP status and carries a human-readable message.
 *
 * # Error Categories
 *
 * - `Unauthorized` - missing or unknown bearer token (401)
 * - `Conflict` - the mutation does not fit the stored record state (409,
 *   body flagged with `conflict: true`)
 * - `BadRequest` - malformed input (400)
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing or unknown bearer token
    #[error("Not authenticated")]
    Unauthorized,

    /// Mutation conflicts with the stored record
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// Malformed request
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message
        message: String,
    },
}

impl BackendError {
    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Unauthorized` - 401 Unauthorized
    /// - `Conflict` - 409 Conflict
    /// - `BadRequest` - 400 Bad Request
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized => "Not authenticated".to_string(),
            Self::Conflict { message } | Self::BadRequest { message } => message.clone(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
