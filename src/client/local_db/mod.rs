//! # Local Database Module
//!
//! SQLite-backed key-value storage for desktop mode. When the application
//! is packaged for the desktop it runs against a local file database
//! instead of a hosted one, and the sync queue lives in that same file.
//!
//! ## Architecture
//!
//! - `LocalDatabase`: connection pool, schema management, [`KeyValueStorage`]
//! - `schema.rs`: schema constants and migration bookkeeping
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crmsync::client::local_db::LocalDatabase;
//! use crmsync::client::offline::KeyValueStorage;
//!
//! # async fn example() -> crmsync::shared::error::Result<()> {
//! let db = LocalDatabase::open("/var/lib/crm/local.db").await?;
//! db.set("crm_sync_cursor", "42").await?;
//! # Ok(())
//! # }
//! ```

pub mod schema;

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::client::offline::KeyValueStorage;
use crate::shared::error::Result;

/// Local database connection manager
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the database file at `path`.
    ///
    /// Creates the parent directory if needed and uses WAL mode.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// The pool is pinned to one long-lived connection because every SQLite
    /// memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations
    ///
    /// Checks the current schema version and applies any pending migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(schema::CREATE_MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await?;

        let current = self.schema_version().await?;
        if !schema::needs_migration(current) {
            return Ok(());
        }

        for version in schema::get_pending_migrations(current) {
            match version {
                1 => self.apply_migration_1().await?,
                other => tracing::warn!("No migration registered for schema version {}", other),
            }
        }

        Ok(())
    }

    /// Migration 1: key-value table
    async fn apply_migration_1(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(schema::CREATE_KV_STORE_TABLE)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (1, ?)")
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Applied local database migration 1");
        Ok(())
    }

    /// Highest applied schema version, 0 for a fresh file
    pub async fn schema_version(&self) -> Result<i32> {
        let (version,): (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database statistics
    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let (keys,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;
        let (bytes,): (i64,) = sqlx::query_as("SELECT COALESCE(SUM(LENGTH(value)), 0) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;

        Ok(DatabaseStats {
            key_count: keys.max(0) as u64,
            stored_bytes: bytes.max(0) as u64,
        })
    }
}

#[async_trait]
impl KeyValueStorage for LocalDatabase {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Number of stored keys
    pub key_count: u64,
    /// Total size of stored values in bytes
    pub stored_bytes: u64,
}
