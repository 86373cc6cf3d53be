//! # Offline Queue
//!
//! Holds mutations made while the server is unreachable until the sync
//! engine can deliver them.
//!
//! ## Module Structure
//!
//! - `storage`: key-value storage backends the queue persists into
//! - `queue`: the FIFO queue of pending mutations
//! - `retry`: optional retry limit for failing mutations

pub mod queue;
pub mod retry;
pub mod storage;

pub use queue::{LocalQueue, QueueStats, QUEUE_STORAGE_KEY};
pub use retry::RetryPolicy;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
