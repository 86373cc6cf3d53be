//! Queue Item Types
//!
//! A [`QueueItem`] is a local mutation (create, update or delete of a CRM
//! entity such as a Lead, Payment or Reminder) waiting to be delivered to the
//! server. Items are identified by an [`ItemId`] assigned at enqueue time,
//! which stays stable while the queue is modified around it.
//!
//! # Serialization
//!
//! Items serialize with camelCase field names, so the persisted queue blob
//! reads `{"id":1,"operation":"CREATE","model":"Lead","recordId":"L1",...}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of a queued item.
///
/// Ids increase monotonically in enqueue order and are never reused within
/// one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Create a new record
    Create,
    /// Update an existing record
    Update,
    /// Delete an existing record
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Delivery state of a queued item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    /// Never attempted
    #[default]
    Pending,
    /// Last push failed; retried on the next pass
    Failed,
    /// Server flagged a conflict; parked until resolved
    Conflict,
}

/// A mutation as requested by the caller, before it is queued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQueueItem {
    pub operation: Operation,
    pub model: String,
    pub record_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub user_id: String,
}

impl NewQueueItem {
    pub fn new(
        operation: Operation,
        model: impl Into<String>,
        record_id: impl Into<String>,
        data: serde_json::Value,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            model: model.into(),
            record_id: record_id.into(),
            data,
            user_id: user_id.into(),
        }
    }

    /// Shorthand for a CREATE mutation
    pub fn create(
        model: impl Into<String>,
        record_id: impl Into<String>,
        data: serde_json::Value,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new(Operation::Create, model, record_id, data, user_id)
    }

    /// Shorthand for an UPDATE mutation
    pub fn update(
        model: impl Into<String>,
        record_id: impl Into<String>,
        data: serde_json::Value,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new(Operation::Update, model, record_id, data, user_id)
    }

    /// Shorthand for a DELETE mutation; the payload is ignored by the server
    pub fn delete(
        model: impl Into<String>,
        record_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new(Operation::Delete, model, record_id, serde_json::Value::Null, user_id)
    }
}

/// A queued mutation with delivery bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: ItemId,
    pub operation: Operation,
    pub model: String,
    pub record_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub user_id: String,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub state: ItemState,
    /// Number of failed push attempts
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl QueueItem {
    /// Wrap a new mutation with its assigned id
    pub fn from_new(id: ItemId, item: NewQueueItem) -> Self {
        Self {
            id,
            operation: item.operation,
            model: item.model,
            record_id: item.record_id,
            data: item.data,
            user_id: item.user_id,
            queued_at: Utc::now(),
            state: ItemState::Pending,
            attempts: 0,
            last_attempt_at: None,
            last_error: None,
        }
    }
}
