//! # Sync Engine
//!
//! Moves queued mutations to the server and pulls server-side changes back.
//!
//! ## Architecture
//!
//! The engine coordinates:
//! - **Local queue**: FIFO of pending mutations ([`LocalQueue`])
//! - **Transport**: push/pull contract ([`SyncTransport`])
//! - **Network monitor**: online flag gating every pass ([`ConnectivityTracker`])
//! - **Scheduler**: startup delay, fixed interval, sync on reconnect ([`AutoSync`])
//! - **Status**: polled snapshot for display ([`SyncStatus`])
//!
//! ## Drain pass
//!
//! A pass is refused while offline or while another pass is running. It
//! takes a snapshot of the queue, pushes each item in FIFO order, removes
//! successes by id right away, parks conflicts and keeps failures for the
//! next pass. One pull follows regardless of push results.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crmsync::client::offline::{LocalQueue, MemoryStorage, RetryPolicy};
//! use crmsync::client::sync::{ConnectivityTracker, SyncEngine};
//! use crmsync::client::sync_client::HttpTransport;
//! use crmsync::shared::SyncConfig;
//!
//! # async fn example() -> crmsync::shared::error::Result<()> {
//! let config = SyncConfig::default();
//! let queue = Arc::new(LocalQueue::load(Arc::new(MemoryStorage::new())).await);
//! let engine = SyncEngine::new(
//!     queue,
//!     Arc::new(HttpTransport::new(&config)?),
//!     ConnectivityTracker::new(true),
//!     RetryPolicy::unbounded(),
//! );
//!
//! let result = engine.trigger_sync().await;
//! println!("synced {} item(s)", result.synced);
//! # Ok(())
//! # }
//! ```

pub mod network_monitor;
pub mod scheduler;
pub mod status;
pub mod sync_state;

pub use network_monitor::{ConnectivityProbe, ConnectivityTracker, HttpProbe, NetworkStatus};
pub use scheduler::{AutoSync, SyncSchedule};
pub use status::{StatusPoller, StatusSnapshot, SyncStatus};
pub use sync_state::{ChangeBatch, PullOutcome, Resolution, ResolveOutcome, SyncResult};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};

use crate::client::offline::{LocalQueue, RetryPolicy};
use crate::client::sync_client::SyncTransport;
use crate::shared::error::SyncError;
use crate::shared::protocol::PushRequest;
use crate::shared::queue_item::{ItemId, ItemState};

/// Storage key of the pull cursor
pub const CURSOR_STORAGE_KEY: &str = "crm_sync_cursor";

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Drains the local queue against the server
pub struct SyncEngine {
    queue: Arc<LocalQueue>,
    transport: Arc<dyn SyncTransport>,
    tracker: ConnectivityTracker,
    retry: RetryPolicy,
    sync_in_progress: AtomicBool,
    changes: broadcast::Sender<ChangeBatch>,
    last_result: RwLock<Option<(SyncResult, DateTime<Utc>)>>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("queue", &self.queue)
            .field("tracker", &self.tracker)
            .field("retry", &self.retry)
            .field("sync_in_progress", &self.sync_in_progress)
            .finish_non_exhaustive()
    }
}

/// Clears the in-progress flag when a pass ends, including when the pass
/// future is dropped early.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncEngine {
    pub fn new(
        queue: Arc<LocalQueue>,
        transport: Arc<dyn SyncTransport>,
        tracker: ConnectivityTracker,
        retry: RetryPolicy,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            queue,
            transport,
            tracker,
            retry,
            sync_in_progress: AtomicBool::new(false),
            changes,
            last_result: RwLock::new(None),
        }
    }

    /// Run one drain pass followed by one pull.
    ///
    /// Returns [`SyncResult::rejected`] without touching the queue when
    /// offline or when another pass is in flight.
    pub async fn trigger_sync(&self) -> SyncResult {
        if !self.tracker.is_online() {
            tracing::debug!("Sync skipped: offline");
            return SyncResult::rejected();
        }
        let Some(_guard) = DrainGuard::acquire(&self.sync_in_progress) else {
            tracing::debug!("Sync skipped: a pass is already running");
            return SyncResult::rejected();
        };

        let snapshot = self.queue.items().await;
        tracing::info!("Sync pass started with {} queued item(s)", snapshot.len());

        let mut result = SyncResult::started();
        for item in snapshot {
            if item.state == ItemState::Conflict {
                continue;
            }

            match self.transport.push(&PushRequest::from(&item)).await {
                Ok(()) => {
                    tracing::debug!("Pushed {} {} {}", item.id, item.operation, item.model);
                    result.synced += 1;
                    self.queue.dequeue(item.id).await;
                }
                Err(SyncError::Conflict { message }) => {
                    tracing::warn!(
                        "Conflict on {} {} {}: {}",
                        item.id,
                        item.model,
                        item.record_id,
                        message
                    );
                    result.conflicts += 1;
                    self.queue.mark_conflict(item.id, &message).await;
                }
                Err(e) => {
                    tracing::debug!("Push of {} failed: {}", item.id, e);
                    result.failed += 1;
                    let attempts = self.queue.record_failure(item.id, &e.to_string()).await;
                    if let Some(attempts) = attempts {
                        if self.retry.should_evict(attempts) {
                            tracing::warn!(
                                "Evicting {} {} {} after {} failed attempts",
                                item.id,
                                item.model,
                                item.record_id,
                                attempts
                            );
                            self.queue.dequeue(item.id).await;
                            result.evicted += 1;
                        }
                    }
                }
            }
        }

        result.pull = Some(self.pull_changes().await);

        tracing::info!(
            "Sync pass finished: {} synced, {} failed, {} conflicts",
            result.synced,
            result.failed,
            result.conflicts
        );
        *self.last_result.write().await = Some((result.clone(), Utc::now()));
        result
    }

    /// Fetch server changes since the stored cursor.
    ///
    /// Never fails: 401 and non-JSON answers are skipped quietly, anything
    /// else is logged and reported as [`PullOutcome::Failed`].
    pub async fn pull_changes(&self) -> PullOutcome {
        let cursor = self.load_cursor().await;

        match self.transport.pull(cursor).await {
            Ok(response) => {
                let count = response.changes.len();
                let next = response.cursor.or(cursor);
                if next != cursor {
                    if let Some(next) = next {
                        self.store_cursor(next).await;
                    }
                }
                if count > 0 {
                    tracing::debug!("Pulled {} change(s)", count);
                    // no receivers is fine
                    let _ = self.changes.send(response.changes);
                }
                PullOutcome::Applied {
                    changes: count,
                    cursor: next,
                }
            }
            Err(SyncError::Unauthenticated) => {
                tracing::debug!("Pull skipped: not authenticated");
                PullOutcome::Unauthenticated
            }
            Err(SyncError::NotJson { content_type }) => {
                tracing::debug!("Pull skipped: non-JSON response ({})", content_type);
                PullOutcome::NotJson
            }
            Err(e) => {
                tracing::warn!("Pull failed: {}", e);
                PullOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Settle a queued item by hand.
    ///
    /// [`Resolution::Server`] drops the item without a network call.
    /// [`Resolution::Local`] pushes it again and removes it only when that
    /// push succeeds.
    ///
    /// Shares the drain flag: while a pass is running the drain may still
    /// push its snapshot of the item, so this returns
    /// [`ResolveOutcome::Busy`] without touching the queue.
    pub async fn resolve_conflict(&self, id: ItemId, resolution: Resolution) -> ResolveOutcome {
        let Some(_guard) = DrainGuard::acquire(&self.sync_in_progress) else {
            tracing::debug!("Resolution of {} deferred: a pass is running", id);
            return ResolveOutcome::Busy;
        };

        match resolution {
            Resolution::Server => match self.queue.dequeue(id).await {
                Some(item) => {
                    tracing::info!(
                        "Discarded {} {} {} in favour of server",
                        id,
                        item.model,
                        item.record_id
                    );
                    ResolveOutcome::Discarded
                }
                None => ResolveOutcome::NotFound,
            },
            Resolution::Local => {
                let Some(item) = self.queue.get(id).await else {
                    return ResolveOutcome::NotFound;
                };

                match self.transport.push(&PushRequest::from(&item)).await {
                    Ok(()) => {
                        self.queue.dequeue(id).await;
                        tracing::info!("Re-applied {} {} {}", id, item.model, item.record_id);
                        ResolveOutcome::Applied
                    }
                    Err(SyncError::Conflict { message }) => {
                        self.queue.mark_conflict(id, &message).await;
                        ResolveOutcome::StillConflicting
                    }
                    Err(e) => {
                        let message = e.to_string();
                        self.queue.record_failure(id, &message).await;
                        ResolveOutcome::Failed { message }
                    }
                }
            }
        }
    }

    /// Receive every non-empty batch of pulled changes
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeBatch> {
        self.changes.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_in_progress.load(Ordering::Acquire)
    }

    /// Most recent completed pass and when it finished
    pub async fn last_result(&self) -> Option<(SyncResult, DateTime<Utc>)> {
        self.last_result.read().await.clone()
    }

    pub fn queue(&self) -> &Arc<LocalQueue> {
        &self.queue
    }

    pub fn tracker(&self) -> &ConnectivityTracker {
        &self.tracker
    }

    /// Last stored pull cursor
    pub async fn cursor(&self) -> Option<u64> {
        self.load_cursor().await
    }

    async fn load_cursor(&self) -> Option<u64> {
        match self.queue.storage().get(CURSOR_STORAGE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(cursor) => Some(cursor),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt pull cursor: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read pull cursor: {}", e);
                None
            }
        }
    }

    async fn store_cursor(&self, cursor: u64) {
        if let Err(e) = self
            .queue
            .storage()
            .set(CURSOR_STORAGE_KEY, &cursor.to_string())
            .await
        {
            tracing::error!("Failed to persist pull cursor: {}", e);
        }
    }
}
