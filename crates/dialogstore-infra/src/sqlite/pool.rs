//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a `DatabasePool`
//! with a multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes. The pool is opened once, migrated, and then
//! handed to the repository; nothing opens a second pool against the same database.

use std::str::FromStr;

use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE and migrations.
///
/// In-memory databases cannot be shared between pools, so for those `reader`
/// is a clone of `writer`.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database and verify it answers a ping.
    ///
    /// File databases use WAL journal mode and a 5-second busy timeout.
    /// Does not touch the schema; run the migration runner before handing the
    /// pool to a repository.
    pub async fn connect(data_source: &str) -> Result<Self, sqlx::Error> {
        Self::open(data_source, true).await
    }

    /// Like [`connect`](Self::connect), but fails instead of creating a
    /// missing database file. `mode=rwc` in the source does not override this.
    pub async fn connect_existing(data_source: &str) -> Result<Self, sqlx::Error> {
        Self::open(data_source, false).await
    }

    async fn open(data_source: &str, create_if_missing: bool) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(data_source)?
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(create_if_missing);

        let pool = if is_in_memory(data_source) {
            // A single connection keeps the one in-memory database alive for
            // the lifetime of the pool.
            let writer = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(base_opts)
                .await?;
            Self {
                reader: writer.clone(),
                writer,
            }
        } else {
            let base_opts = base_opts.journal_mode(SqliteJournalMode::Wal);
            let read_opts = base_opts.clone().read_only(true);

            let writer = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(base_opts)
                .await?;

            let reader = SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(read_opts)
                .await?;

            Self { reader, writer }
        };

        pool.ping().await?;
        tracing::debug!(data_source, "database connection established");
        Ok(pool)
    }

    /// Round-trip to the database on both pools.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        self.writer.acquire().await?.ping().await?;
        self.reader.acquire().await?.ping().await?;
        Ok(())
    }

    /// Close both pools, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}

fn is_in_memory(data_source: &str) -> bool {
    data_source.contains(":memory:") || data_source.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test_wal.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = DatabasePool::connect(&url).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_pool_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fresh.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = DatabasePool::connect(&url).await.unwrap();
        pool.ping().await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_connect_existing_refuses_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("typo.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        assert!(DatabasePool::connect_existing(&url).await.is_err());
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_connect_existing_opens_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("there.db").display());

        DatabasePool::connect(&url).await.unwrap().close().await;
        let pool = DatabasePool::connect_existing(&url).await.unwrap();
        pool.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_pool_shares_one_database() {
        let pool = DatabasePool::connect("sqlite::memory:").await.unwrap();

        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool.writer)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_ping_fails_after_close() {
        let pool = DatabasePool::connect("sqlite::memory:").await.unwrap();
        pool.close().await;
        assert!(pool.ping().await.is_err());
    }

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://test.db?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://dialogs.db?mode=rwc"));
    }
}
