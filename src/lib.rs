//! crmsync - CRM Client Sync
//!
//! Best-effort synchronization for a multi-tenant CRM client. Mutations made
//! while the server is unreachable (creating a lead, updating a payment,
//! deleting a reminder) are queued locally, replayed in order once the
//! server is back, and server-side changes are pulled in return.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - Queued mutation model, push/pull wire types
//!   - Configuration and error types
//!
//! - **`client`** - Sync client (native targets)
//!   - Local queue with memory, file and SQLite storage
//!   - Connectivity tracker, sync engine, scheduler, status surface
//!   - HTTP transport
//!
//! - **`backend`** - Reference sync server (only compiled with `ssr`)
//!   - Axum push/pull endpoints over an in-memory record store
//!
//! # Feature Flags
//!
//! - **`ssr`** - builds the reference server (`crmsync-server` binary)
//!
//! # Usage
//!
//! ```rust,no_run
//! use crmsync::client::{config, SyncContext};
//! use crmsync::shared::NewQueueItem;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let context = SyncContext::build(config::load()?).await?;
//!
//! context
//!     .queue()
//!     .enqueue(NewQueueItem::create("Lead", "L1", serde_json::json!({"name": "Acme"}), "U1"))
//!     .await;
//!
//! let result = context.engine().trigger_sync().await;
//! println!("{} synced, {} failed, {} conflicts", result.synced, result.failed, result.conflicts);
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees
//!
//! Delivery is at-least-once at best: an item is removed only after the
//! server confirms it, a failed push is retried on the next pass, and a
//! conflict waits for explicit resolution. Persistence is a whole-queue
//! blob rewritten on every change.

/// Shared types and data structures
pub mod shared;

/// Sync client
#[cfg(not(target_arch = "wasm32"))]
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
