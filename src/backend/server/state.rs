/**
 * Application State
 *
 * Shared state handed to every handler: the record store and the accepted
 * bearer tokens. Cloning is cheap; all fields are reference counted.
 */

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::sync::SyncStore;

/// Application state shared across all routes
#[derive(Debug, Clone)]
pub struct AppState {
    /// Records and change log
    pub store: Arc<RwLock<SyncStore>>,
    /// Accepted bearer tokens; empty disables authentication
    pub tokens: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(tokens: HashSet<String>) -> Self {
        Self {
            store: Arc::new(RwLock::new(SyncStore::new())),
            tokens: Arc::new(tokens),
        }
    }
}
