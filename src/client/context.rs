//! Sync context
//!
//! Builds the sync subsystem once per process from configuration and hands
//! out the shared pieces: queue, engine, status surface and scheduler.

use std::sync::Arc;

use crate::client::local_db::LocalDatabase;
use crate::client::offline::{FileStorage, KeyValueStorage, LocalQueue, MemoryStorage, RetryPolicy};
use crate::client::sync::{AutoSync, ConnectivityTracker, HttpProbe, SyncEngine, SyncSchedule, SyncStatus};
use crate::client::sync_client::{HttpTransport, SyncTransport};
use crate::shared::config::{StorageBackend, SyncConfig};
use crate::shared::error::Result;

const SQLITE_FILE_NAME: &str = "crmsync.db";

/// Wired-up sync subsystem
#[derive(Debug, Clone)]
pub struct SyncContext {
    config: SyncConfig,
    engine: Arc<SyncEngine>,
    status: SyncStatus,
}

impl SyncContext {
    /// Open storage, restore the queue and connect to the configured server.
    ///
    /// Connectivity is seeded from one health probe.
    pub async fn build(config: SyncConfig) -> Result<Self> {
        let storage = open_storage(&config).await?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        let tracker = ConnectivityTracker::from_probe(&HttpProbe::new(&config)?).await;

        Ok(Self::with_parts(config, storage, transport, tracker).await)
    }

    /// Assemble a context from explicit parts
    pub async fn with_parts(
        config: SyncConfig,
        storage: Arc<dyn KeyValueStorage>,
        transport: Arc<dyn SyncTransport>,
        tracker: ConnectivityTracker,
    ) -> Self {
        let queue = Arc::new(LocalQueue::load(storage).await);
        let engine = Arc::new(SyncEngine::new(
            queue,
            transport,
            tracker,
            RetryPolicy::from_max_retries(config.max_retries),
        ));
        let status = SyncStatus::new(engine.clone());

        Self {
            config,
            engine,
            status,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub fn queue(&self) -> &Arc<LocalQueue> {
        self.engine.queue()
    }

    pub fn tracker(&self) -> &ConnectivityTracker {
        self.engine.tracker()
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Start the auto-sync scheduler with the configured timing
    pub fn start_auto_sync(&self) -> AutoSync {
        AutoSync::start(self.engine.clone(), SyncSchedule::from_config(&self.config))
    }
}

/// Open the storage backend selected by `config`
pub async fn open_storage(config: &SyncConfig) -> Result<Arc<dyn KeyValueStorage>> {
    let storage: Arc<dyn KeyValueStorage> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(FileStorage::new(config.resolved_data_dir())),
        StorageBackend::Sqlite => {
            let path = config.resolved_data_dir().join(SQLITE_FILE_NAME);
            tracing::info!("Using desktop database at {}", path.display());
            Arc::new(LocalDatabase::open(path).await?)
        }
    };
    Ok(storage)
}
