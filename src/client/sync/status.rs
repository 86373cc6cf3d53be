//! # Sync Status
//!
//! Read-only view of the sync subsystem for display: queue counts, the
//! per-model breakdown, connectivity and the last pass. Refreshed by
//! polling on a fixed interval; it holds no state of its own beyond the
//! latest snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::sync::{SyncEngine, SyncResult};
use crate::shared::queue_item::ItemState;

/// Point-in-time view of the sync subsystem
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Items never attempted
    pub pending: usize,
    /// Items whose last push failed
    pub failed: usize,
    /// Items parked on a conflict
    pub conflicts: usize,
    pub total: usize,
    pub by_model: BTreeMap<String, usize>,
    pub is_online: bool,
    pub is_syncing: bool,
    pub last_result: Option<SyncResult>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub persist_failures: u64,
}

/// Status surface over a [`SyncEngine`]
#[derive(Debug, Clone)]
pub struct SyncStatus {
    engine: Arc<SyncEngine>,
}

impl SyncStatus {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    /// Compute a fresh snapshot
    pub async fn snapshot(&self) -> StatusSnapshot {
        let queue = self.engine.queue();
        let stats = queue.stats().await;
        let (last_result, last_synced_at) = match self.engine.last_result().await {
            Some((result, at)) => (Some(result), Some(at)),
            None => (None, None),
        };

        StatusSnapshot {
            pending: stats.pending,
            failed: stats.failed,
            conflicts: stats.conflicts,
            total: stats.total,
            by_model: queue.by_model().await,
            is_online: self.engine.tracker().is_online(),
            is_syncing: self.engine.is_syncing(),
            last_result,
            last_synced_at,
            persist_failures: queue.persist_failures(),
        }
    }

    /// Number of items in one state
    pub async fn count(&self, state: ItemState) -> usize {
        self.engine.queue().count_by_state(state).await
    }

    /// Manual "sync now"
    pub async fn trigger_sync(&self) -> SyncResult {
        self.engine.trigger_sync().await
    }

    /// Publish a snapshot every `interval` until the poller is dropped
    pub fn spawn_polling(&self, interval: Duration) -> StatusPoller {
        let (sender, receiver) = watch::channel(StatusSnapshot::default());
        let status = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let snapshot = status.snapshot().await;
                if sender.send(snapshot).is_err() {
                    break;
                }
            }
        });

        StatusPoller { receiver, handle }
    }
}

/// Background status refresher
#[derive(Debug)]
pub struct StatusPoller {
    receiver: watch::Receiver<StatusSnapshot>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Most recently published snapshot
    pub fn latest(&self) -> StatusSnapshot {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.receiver.clone()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
