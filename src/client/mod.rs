//! # Client Module
//!
//! Client side of CRM sync: mutations made while the server is unreachable
//! are queued locally and replayed once it is back.
//!
//! ## Module Structure
//!
//! - `offline`: local queue and its key-value storage backends
//! - `local_db`: SQLite storage for desktop mode
//! - `sync_client`: push/pull HTTP transport
//! - `sync`: engine, connectivity tracker, scheduler and status surface
//! - `config`: configuration loading from file and environment
//! - `context`: one-shot wiring of all of the above

pub mod config;
pub mod context;
pub mod local_db;
pub mod offline;
pub mod sync;
pub mod sync_client;

pub use context::SyncContext;
pub use offline::{LocalQueue, RetryPolicy};
pub use sync::{
    AutoSync, ConnectivityTracker, PullOutcome, Resolution, ResolveOutcome, StatusSnapshot,
    SyncEngine, SyncResult, SyncStatus,
};
pub use sync_client::{HttpTransport, SyncTransport};
