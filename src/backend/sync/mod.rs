//! Sync Module
//!
//! Server side of the push/pull contract: the record store with its change
//! log, and the HTTP handlers in front of it.

pub mod handlers;
pub mod store;

pub use store::{StoredRecord, SyncStore};
