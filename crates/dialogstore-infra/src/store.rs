//! Storage engine selection.
//!
//! `DialogStore` picks the repository adapter named by the configured driver
//! and forwards every `DialogRepository` call to it, so the service can be
//! pinned to one concrete type regardless of the engine.

use dialogstore_core::repository::dialog::DialogRepository;
use dialogstore_types::config::{DatabaseConfig, Driver};
use dialogstore_types::dialog::Dialog;
use dialogstore_types::error::DialogError;
use thiserror::Error;

use crate::memory::dialog::InMemoryDialogRepository;
use crate::sqlite::dialog::SqliteDialogRepository;
use crate::sqlite::migrate::{MigrationError, MigrationRunner};
use crate::sqlite::pool::DatabasePool;

/// Failures while opening the store. Both are fatal to startup.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot connect to '{data_source}': {source}")]
    Connect {
        data_source: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Repository for whichever engine the configuration selects.
pub enum DialogStore {
    Sqlite(SqliteDialogRepository),
    Memory(InMemoryDialogRepository),
}

impl DialogStore {
    /// Open the configured engine and make it ready for use.
    ///
    /// For SQLite this connects, pings, runs all pending migrations, and then
    /// reuses the same pool for the repository. The memory driver has no
    /// schema and starts empty.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, OpenError> {
        match config.driver {
            Driver::Sqlite => {
                let pool = DatabasePool::connect(&config.data_source)
                    .await
                    .map_err(|source| OpenError::Connect {
                        data_source: config.data_source.clone(),
                        source,
                    })?;

                let report = MigrationRunner::new(&pool, &config.migrations_path)
                    .run()
                    .await?;
                tracing::info!(
                    version = ?report.version,
                    applied = report.applied.len(),
                    "sqlite store ready"
                );

                Ok(DialogStore::Sqlite(SqliteDialogRepository::new(pool)))
            }
            Driver::Memory => {
                tracing::info!("memory store ready");
                Ok(DialogStore::Memory(InMemoryDialogRepository::new()))
            }
        }
    }

    pub fn driver(&self) -> Driver {
        match self {
            DialogStore::Sqlite(_) => Driver::Sqlite,
            DialogStore::Memory(_) => Driver::Memory,
        }
    }
}

impl DialogRepository for DialogStore {
    async fn create(&self, dialog: &Dialog) -> Result<i64, DialogError> {
        match self {
            DialogStore::Sqlite(repo) => repo.create(dialog).await,
            DialogStore::Memory(repo) => repo.create(dialog).await,
        }
    }

    async fn get(&self, id: i64) -> Result<Dialog, DialogError> {
        match self {
            DialogStore::Sqlite(repo) => repo.get(id).await,
            DialogStore::Memory(repo) => repo.get(id).await,
        }
    }

    async fn update(&self, dialog: &Dialog) -> Result<(), DialogError> {
        match self {
            DialogStore::Sqlite(repo) => repo.update(dialog).await,
            DialogStore::Memory(repo) => repo.update(dialog).await,
        }
    }

    async fn update_reply(&self, dialog: &Dialog) -> Result<(), DialogError> {
        match self {
            DialogStore::Sqlite(repo) => repo.update_reply(dialog).await,
            DialogStore::Memory(repo) => repo.update_reply(dialog).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DialogError> {
        match self {
            DialogStore::Sqlite(repo) => repo.delete(id).await,
            DialogStore::Memory(repo) => repo.delete(id).await,
        }
    }

    async fn ping(&self) -> Result<(), DialogError> {
        match self {
            DialogStore::Sqlite(repo) => repo.ping().await,
            DialogStore::Memory(repo) => repo.ping().await,
        }
    }

    async fn close(self) {
        match self {
            DialogStore::Sqlite(repo) => repo.close().await,
            DialogStore::Memory(repo) => repo.close().await,
        }
    }
}
