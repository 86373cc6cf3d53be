/**
 * Sync Record Store
 *
 * In-memory record table keyed by (model, record id) plus an append-only
 * change log. Every applied push gets the next sequence number; pulls read
 * the log after a client's cursor.
 *
 * # Conflict Rules
 *
 * - CREATE of a record that already exists
 * - UPDATE or DELETE of a record that does not exist
 */

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;

use crate::backend::error::BackendError;
use crate::shared::protocol::{PullResponse, PushRequest, RemoteChange};
use crate::shared::queue_item::Operation;

/// Current server-side state of one record
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub data: Value,
    pub user_id: String,
    /// Sequence number of the last change to this record
    pub seq: u64,
}

/// Records and change log
#[derive(Debug, Default)]
pub struct SyncStore {
    records: HashMap<(String, String), StoredRecord>,
    log: Vec<RemoteChange>,
    next_seq: u64,
}

impl SyncStore {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            ..Self::default()
        }
    }

    /// Apply a pushed mutation. Returns the sequence number of the change.
    pub fn apply(&mut self, request: PushRequest) -> Result<u64, BackendError> {
        if request.model.trim().is_empty() || request.record_id.trim().is_empty() {
            return Err(BackendError::bad_request("model and recordId are required"));
        }

        let key = (request.model.clone(), request.record_id.clone());
        let seq = self.next_seq.max(1);

        match request.operation {
            Operation::Create => {
                if self.records.contains_key(&key) {
                    return Err(BackendError::conflict(format!(
                        "{} {} already exists",
                        request.model, request.record_id
                    )));
                }
                self.records.insert(
                    key,
                    StoredRecord {
                        data: request.data.clone(),
                        user_id: request.user_id.clone(),
                        seq,
                    },
                );
            }
            Operation::Update => {
                let Some(record) = self.records.get_mut(&key) else {
                    return Err(BackendError::conflict(format!(
                        "{} {} does not exist",
                        request.model, request.record_id
                    )));
                };
                merge(&mut record.data, request.data.clone());
                record.user_id = request.user_id.clone();
                record.seq = seq;
            }
            Operation::Delete => {
                if self.records.remove(&key).is_none() {
                    return Err(BackendError::conflict(format!(
                        "{} {} does not exist",
                        request.model, request.record_id
                    )));
                }
            }
        }

        self.next_seq = seq + 1;
        self.log.push(RemoteChange {
            seq,
            operation: request.operation,
            model: request.model,
            record_id: request.record_id,
            data: request.data,
            user_id: request.user_id,
            applied_at: Utc::now(),
        });
        Ok(seq)
    }

    /// Changes recorded after `since`, oldest first.
    ///
    /// The cursor is the last returned sequence number, or `since` when
    /// nothing new was recorded.
    pub fn changes_since(&self, since: Option<u64>) -> PullResponse {
        let after = since.unwrap_or(0);
        let changes: Vec<RemoteChange> = self
            .log
            .iter()
            .filter(|change| change.seq > after)
            .cloned()
            .collect();
        let cursor = changes.last().map(|change| change.seq).or(since);

        PullResponse { changes, cursor }
    }

    pub fn record(&self, model: &str, record_id: &str) -> Option<&StoredRecord> {
        self.records.get(&(model.to_string(), record_id.to_string()))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Sequence number of the latest change, 0 when nothing was applied
    pub fn head(&self) -> u64 {
        self.log.last().map(|change| change.seq).unwrap_or(0)
    }
}

// Object payloads merge field by field; anything else replaces.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}
