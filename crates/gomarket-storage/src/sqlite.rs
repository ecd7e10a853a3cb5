//! # SQLite Store
//!
//! Connection pool creation and the SQLite-backed key-value store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Key-Value Store                             │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageConfig::new(path) ← Configure pool settings                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::new(config).await ← Create pool + run migrations         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  kv_store                               │                           │
//! │  │  key (PK) │ value (TEXT) │ updated_at   │                           │
//! │  │  ─────────┼──────────────┼───────────── │                           │
//! │  │  @GoMarket:productsInCart │ [...] │ ... │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  set_item = INSERT ... ON CONFLICT(key) DO UPDATE (whole value)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File-backed databases use WAL journaling so the occasional read during
//! hydration never blocks the writer.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;
use crate::migrations;

/// Path value that selects a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Storage configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StorageConfig::new("/path/to/gomarket.db")
///     .max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 2 (one writer, one hydration read)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl StorageConfig {
    /// Creates a new storage configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StorageConfig {
            database_path: path.into(),
            max_connections: 2,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        StorageConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> StorageResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StorageError::ConnectionFailed(e.to_string()));
        }

        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true))
    }
}

// =============================================================================
// Store
// =============================================================================

/// SQLite-backed key-value store.
///
/// Cloning is cheap: clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database, creating the pool and running migrations.
    ///
    /// ## Returns
    /// * `Ok(SqliteStore)` - Ready-to-use store
    /// * `Err(StorageError)` - Connection or migration failed
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening cart storage"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Storage pool created"
        );

        let store = SqliteStore { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        Ok(store)
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> StorageResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Storage migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool. Later operations fail.
    pub async fn close(&self) {
        info!("Closing storage connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv read");
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv write");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, "kv delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let store = SqliteStore::new(StorageConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = StorageConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(StorageConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_set_get_overwrite_remove() {
        let store = SqliteStore::new(StorageConfig::in_memory()).await.unwrap();

        assert_eq!(store.get_item("cart").await.unwrap(), None);

        store.set_item("cart", "[]").await.unwrap();
        store.set_item("cart", r#"[{"id":"A"}]"#).await.unwrap();
        assert_eq!(
            store.get_item("cart").await.unwrap().as_deref(),
            Some(r#"[{"id":"A"}]"#)
        );

        store.remove_item("cart").await.unwrap();
        assert_eq!(store.get_item("cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = SqliteStore::new(StorageConfig::in_memory()).await.unwrap();

        store.set_item("a", "1").await.unwrap();
        store.set_item("b", "2").await.unwrap();
        store.remove_item("a").await.unwrap();

        assert_eq!(store.get_item("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gomarket.db");

        let store = SqliteStore::new(StorageConfig::new(&path)).await.unwrap();
        store.set_item("cart", "[1]").await.unwrap();
        store.close().await;

        let reopened = SqliteStore::new(StorageConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.get_item("cart").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_error() {
        let store = SqliteStore::new(StorageConfig::in_memory()).await.unwrap();
        store.close().await;

        assert!(!store.health_check().await);
        assert!(store.set_item("cart", "[]").await.is_err());
    }
}
