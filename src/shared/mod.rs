//! Shared Module
//!
//! Types shared between the sync client and the reference sync server:
//! the queued mutation model, the push/pull wire contract, configuration
//! and error types.
//!
//! # Overview
//!
//! Everything here is platform-agnostic and serializable, so both sides of
//! the push/pull contract agree on field names and shapes.

/// Queued mutation model
pub mod queue_item;

/// Push/pull wire types
pub mod protocol;

/// Sync error types
pub mod error;

/// Sync configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{ConfigError, StorageBackend, SyncConfig, SyncConfigBuilder};
pub use error::SyncError;
pub use protocol::{ErrorBody, PullResponse, PushRequest, PushResponse, RemoteChange};
pub use queue_item::{ItemId, ItemState, NewQueueItem, Operation, QueueItem};
