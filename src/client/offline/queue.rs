//! # Local Queue Store
//!
//! Ordered list of pending mutations, persisted as a single JSON array
//! under [`QUEUE_STORAGE_KEY`] and rewritten in full on every change.
//!
//! ## Features
//!
//! - **FIFO**: items are kept and replayed in enqueue order
//! - **Stable ids**: every item gets a monotonically increasing [`ItemId`],
//!   removal is by id and never by position
//! - **Best-effort persistence**: a failed write is logged and counted, the
//!   in-memory queue keeps going
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crmsync::client::offline::{LocalQueue, MemoryStorage};
//! use crmsync::shared::NewQueueItem;
//!
//! # async fn example() {
//! let queue = LocalQueue::load(Arc::new(MemoryStorage::new())).await;
//!
//! let id = queue
//!     .enqueue(NewQueueItem::create("Lead", "L1", serde_json::json!({"name": "Acme"}), "U1"))
//!     .await;
//! assert_eq!(queue.count_by_model("Lead").await, 1);
//!
//! queue.dequeue(id).await;
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::client::offline::storage::KeyValueStorage;
use crate::shared::queue_item::{ItemId, ItemState, NewQueueItem, QueueItem};

/// Storage key of the persisted queue blob
pub const QUEUE_STORAGE_KEY: &str = "crm_sync_queue";

#[derive(Debug, Default)]
struct QueueState {
    items: Vec<QueueItem>,
    next_id: u64,
}

/// Persistent FIFO queue of local mutations
#[derive(Debug)]
pub struct LocalQueue {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<QueueState>,
    persist_failures: AtomicU64,
}

impl LocalQueue {
    /// Create an empty queue over `storage` without reading it.
    ///
    /// The first mutation overwrites whatever blob was stored before; use
    /// [`LocalQueue::load`] to resume a persisted queue.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(QueueState {
                items: Vec::new(),
                next_id: 1,
            }),
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Restore the queue persisted in `storage`.
    ///
    /// A missing blob yields an empty queue. An unreadable or corrupt blob is
    /// logged and also yields an empty queue.
    pub async fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let items = match storage.get(QUEUE_STORAGE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<QueueItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("Discarding corrupt sync queue blob: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read sync queue from storage: {}", e);
                Vec::new()
            }
        };

        let next_id = items.iter().map(|item| item.id.0).max().unwrap_or(0) + 1;
        if !items.is_empty() {
            tracing::info!("Restored {} queued mutation(s)", items.len());
        }

        Self {
            storage,
            state: RwLock::new(QueueState { items, next_id }),
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Append a mutation and persist the queue. Returns the assigned id.
    pub async fn enqueue(&self, item: NewQueueItem) -> ItemId {
        let mut state = self.state.write().await;
        let id = ItemId(state.next_id);
        state.next_id += 1;

        tracing::debug!(
            "Queued {} {} {} as {}",
            item.operation,
            item.model,
            item.record_id,
            id
        );
        state.items.push(QueueItem::from_new(id, item));
        self.persist(&state.items).await;
        id
    }

    /// Remove the item with `id` and persist the queue.
    pub async fn dequeue(&self, id: ItemId) -> Option<QueueItem> {
        let mut state = self.state.write().await;
        let position = state.items.iter().position(|item| item.id == id)?;
        let removed = state.items.remove(position);
        self.persist(&state.items).await;
        Some(removed)
    }

    /// Number of queued items
    pub async fn count(&self) -> usize {
        self.state.read().await.items.len()
    }

    /// Number of queued items for one model
    pub async fn count_by_model(&self, model: &str) -> usize {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|item| item.model == model)
            .count()
    }

    /// Number of queued items in `state`
    pub async fn count_by_state(&self, state: ItemState) -> usize {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|item| item.state == state)
            .count()
    }

    /// Per-model item counts
    pub async fn by_model(&self) -> BTreeMap<String, usize> {
        let state = self.state.read().await;
        let mut counts = BTreeMap::new();
        for item in &state.items {
            *counts.entry(item.model.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Snapshot of all items in FIFO order
    pub async fn items(&self) -> Vec<QueueItem> {
        self.state.read().await.items.clone()
    }

    pub async fn get(&self, id: ItemId) -> Option<QueueItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Record a failed push attempt.
    ///
    /// Returns the attempt count after the update, or `None` if the item is
    /// no longer queued.
    pub async fn record_failure(&self, id: ItemId, error: &str) -> Option<u32> {
        self.update(id, |item| {
            item.state = ItemState::Failed;
            item.attempts += 1;
            item.last_attempt_at = Some(Utc::now());
            item.last_error = Some(error.to_string());
            item.attempts
        })
        .await
    }

    /// Park an item after the server flagged a conflict
    pub async fn mark_conflict(&self, id: ItemId, message: &str) -> bool {
        self.update(id, |item| {
            item.state = ItemState::Conflict;
            item.last_attempt_at = Some(Utc::now());
            item.last_error = Some(message.to_string());
        })
        .await
        .is_some()
    }

    /// Return an item to the pending state
    pub async fn mark_pending(&self, id: ItemId) -> bool {
        self.update(id, |item| {
            item.state = ItemState::Pending;
        })
        .await
        .is_some()
    }

    /// Drop every queued item
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.items.clear();
        self.persist(&state.items).await;
    }

    /// Get queue statistics
    pub async fn stats(&self) -> QueueStats {
        let state = self.state.read().await;

        let mut stats = QueueStats {
            total: state.items.len(),
            ..QueueStats::default()
        };
        for item in &state.items {
            match item.state {
                ItemState::Pending => stats.pending += 1,
                ItemState::Failed => stats.failed += 1,
                ItemState::Conflict => stats.conflicts += 1,
            }
        }
        stats
    }

    /// Number of persistence writes that failed since startup
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Storage backing this queue
    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    async fn update<T>(&self, id: ItemId, f: impl FnOnce(&mut QueueItem) -> T) -> Option<T> {
        let mut state = self.state.write().await;
        let item = state.items.iter_mut().find(|item| item.id == id)?;
        let result = f(item);
        self.persist(&state.items).await;
        Some(result)
    }

    // Called with the write lock held so the blob matches memory order.
    async fn persist(&self, items: &[QueueItem]) {
        let blob = match serde_json::to_string(items) {
            Ok(blob) => blob,
            Err(e) => {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Failed to serialize sync queue: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(QUEUE_STORAGE_KEY, &blob).await {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!("Failed to persist sync queue ({} items): {}", items.len(), e);
        }
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Total items in queue
    pub total: usize,
    /// Items never attempted
    pub pending: usize,
    /// Items whose last push failed
    pub failed: usize,
    /// Items parked on a conflict
    pub conflicts: usize,
}
