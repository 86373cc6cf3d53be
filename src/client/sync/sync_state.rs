//! # Sync Outcomes
//!
//! Typed results of drain passes, pulls and conflict resolution, so callers
//! and tests assert on values instead of log output.

use serde::Serialize;

use crate::shared::protocol::RemoteChange;

/// Outcome of one drain pass.
///
/// `success` means the pass ran, not that every item was delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub synced: usize,
    pub failed: usize,
    pub conflicts: usize,
    /// Items dropped after reaching the retry limit
    pub evicted: usize,
    /// Outcome of the pull step; `None` when the pass was rejected
    pub pull: Option<PullOutcome>,
}

impl SyncResult {
    /// Result of a trigger refused because the client is offline or a pass
    /// is already running
    pub fn rejected() -> Self {
        Self::default()
    }

    pub(crate) fn started() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn is_rejected(&self) -> bool {
        !self.success
    }
}

/// Outcome of pulling server changes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PullOutcome {
    /// Changes received and the cursor advanced
    Applied {
        changes: usize,
        cursor: Option<u64>,
    },
    /// Server answered 401
    Unauthenticated,
    /// Server answered with something other than JSON
    NotJson,
    /// Any other failure
    Failed { message: String },
}

/// Which side wins a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Push the local mutation again
    Local,
    /// Drop the local mutation
    Server,
}

/// Outcome of [`SyncEngine::resolve_conflict`](super::SyncEngine::resolve_conflict)
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Local item dropped without a network call
    Discarded,
    /// Retry succeeded and the item was removed
    Applied,
    /// Server flagged the retry as a conflict again; item kept
    StillConflicting,
    /// Retry failed for another reason; item kept for the next pass
    Failed { message: String },
    /// No queued item with that id
    NotFound,
    /// A drain pass or another resolution is running; nothing was changed
    Busy,
}

/// Batch of changes received by a pull, as broadcast to subscribers
pub type ChangeBatch = Vec<RemoteChange>;
