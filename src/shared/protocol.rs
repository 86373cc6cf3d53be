//! Push/Pull Wire Types
//!
//! Request and response bodies exchanged between the sync client and the
//! sync server. Both sides use these types so the contract lives in one
//! place.
//!
//! # Endpoints
//!
//! - `POST /api/sync/push` - body [`PushRequest`], 2xx on success, error body
//!   [`ErrorBody`] otherwise (`conflict: true` marks a conflict)
//! - `POST /api/sync/pull?since=N` - no body, answers [`PullResponse`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::queue_item::{Operation, QueueItem};

/// Push endpoint path
pub const PUSH_PATH: &str = "/api/sync/push";

/// Pull endpoint path
pub const PULL_PATH: &str = "/api/sync/pull";

/// Health endpoint path
pub const HEALTH_PATH: &str = "/health";

/// Body of a push request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub operation: Operation,
    pub model: String,
    pub record_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub user_id: String,
}

impl From<&QueueItem> for PushRequest {
    fn from(item: &QueueItem) -> Self {
        Self {
            operation: item.operation,
            model: item.model.clone(),
            record_id: item.record_id.clone(),
            data: item.data.clone(),
            user_id: item.user_id.clone(),
        }
    }
}

/// Successful push response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushResponse {
    pub applied: bool,
    /// Change-log sequence number assigned by the server
    pub seq: u64,
}

/// Error body returned by either endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub conflict: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            conflict: true,
            message: Some(message.into()),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            conflict: false,
            message: Some(message.into()),
        }
    }
}

/// A change recorded by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChange {
    pub seq: u64,
    pub operation: Operation,
    pub model: String,
    pub record_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub user_id: String,
    pub applied_at: DateTime<Utc>,
}

/// Pull response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    #[serde(default)]
    pub changes: Vec<RemoteChange>,
    /// Highest sequence number included; absent when the server does not
    /// track a cursor
    #[serde(default)]
    pub cursor: Option<u64>,
}
