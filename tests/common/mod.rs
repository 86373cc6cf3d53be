//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - A scripted in-process transport
//! - wiremock helpers for HTTP contract tests
//! - Custom assertion macros

pub mod assertions;
pub mod mock_server;
pub mod mock_transport;

// Re-export commonly used utilities
pub use mock_server::*;
pub use mock_transport::*;

use std::sync::Arc;

use crmsync::client::offline::{KeyValueStorage, LocalQueue, MemoryStorage, RetryPolicy};
use crmsync::client::sync::{ConnectivityTracker, SyncEngine};

/// Engine over an in-memory queue and the given transport
pub async fn engine_with(
    transport: Arc<ScriptedTransport>,
    online: bool,
    retry: RetryPolicy,
) -> SyncEngine {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let queue = Arc::new(LocalQueue::load(storage).await);
    SyncEngine::new(queue, transport, ConnectivityTracker::new(online), retry)
}
