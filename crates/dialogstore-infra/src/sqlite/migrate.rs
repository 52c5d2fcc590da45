//! Versioned schema migrations.
//!
//! Migrations are `{version}_{title}.up.sql` files in one directory. The
//! database records the last applied version and a dirty flag in
//! `schema_migrations`. A run applies every file newer than the recorded
//! version, in ascending order, each inside its own transaction:
//!
//! 1. record `(version, dirty = true)`
//! 2. execute the script and commit
//! 3. record `(version, dirty = false)`
//!
//! A script that fails leaves the dirty row behind and stops the run. Every
//! later run refuses to start until an operator repairs the schema and clears
//! the flag; nothing here rolls back or retries.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::pool::DatabasePool;

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// Errors that stop a migration run. All of them are fatal to startup.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("cannot read migrations at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid migration file name '{0}', expected {{version}}_{{title}}.up.sql")]
    InvalidFileName(String),

    #[error("migration version {0} is defined more than once")]
    DuplicateVersion(i64),

    #[error("database is dirty at version {version}; fix the schema and clear the flag manually")]
    Dirty { version: i64 },

    #[error("database is at version {version}, which has no migration file")]
    UnknownVersion { version: i64 },

    #[error("migration {version} failed: {source}")]
    Failed {
        version: i64,
        #[source]
        source: sqlx::Error,
    },

    #[error("migration bookkeeping failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// One `up` script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub title: String,
    pub sql: String,
}

/// Schema state after a run.
///
/// `applied` is empty when the database was already current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<i64>,
    pub version: Option<i64>,
    pub dirty: bool,
}

/// Brings a database to the newest migration found in a directory.
pub struct MigrationRunner<'a> {
    pool: &'a DatabasePool,
    migrations_path: PathBuf,
}

impl<'a> MigrationRunner<'a> {
    /// Borrow an open pool; the runner never opens connections of its own.
    pub fn new(pool: &'a DatabasePool, migrations_path: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            migrations_path: migrations_path.into(),
        }
    }

    /// Apply all pending migrations in ascending version order.
    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        let migrations = load_migrations(&self.migrations_path).await?;
        self.ensure_state_table().await?;

        let current = self.current_state().await?;
        if let Some((version, true)) = current {
            return Err(MigrationError::Dirty { version });
        }
        let current_version = current.map(|(version, _)| version);

        if let Some(version) = current_version {
            if !migrations.iter().any(|m| m.version == version) {
                return Err(MigrationError::UnknownVersion { version });
            }
        }

        let pending: Vec<&Migration> = migrations
            .iter()
            .filter(|m| current_version.is_none_or(|v| m.version > v))
            .collect();

        if pending.is_empty() {
            tracing::info!(version = ?current_version, "database schema is up to date");
            return Ok(MigrationReport {
                applied: Vec::new(),
                version: current_version,
                dirty: false,
            });
        }

        tracing::info!(count = pending.len(), "applying pending migrations");

        let mut applied = Vec::with_capacity(pending.len());
        for migration in pending {
            self.apply(migration).await?;
            applied.push(migration.version);
        }

        Ok(MigrationReport {
            version: applied.last().copied(),
            applied,
            dirty: false,
        })
    }

    /// Current `(version, dirty)` without applying anything.
    ///
    /// `None` when no migration has ever been recorded. Read-only: a
    /// database without `schema_migrations` is left untouched.
    pub async fn version(&self) -> Result<Option<(i64, bool)>, MigrationError> {
        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
        )
        .fetch_one(&self.pool.reader)
        .await?;
        if tables == 0 {
            return Ok(None);
        }
        self.current_state().await
    }

    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        tracing::info!(
            version = migration.version,
            title = %migration.title,
            "applying migration"
        );

        self.record_state(migration.version, true).await?;

        let mut tx = self.pool.writer.begin().await?;
        if let Err(source) = sqlx::raw_sql(&migration.sql).execute(&mut *tx).await {
            tracing::error!(
                version = migration.version,
                error = %source,
                "migration failed; database left dirty"
            );
            // Dropping `tx` rolls back the partial script.
            return Err(MigrationError::Failed {
                version: migration.version,
                source,
            });
        }
        tx.commit()
            .await
            .map_err(|source| MigrationError::Failed {
                version: migration.version,
                source,
            })?;

        self.record_state(migration.version, false).await?;
        Ok(())
    }

    async fn ensure_state_table(&self) -> Result<(), MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER NOT NULL, dirty BOOLEAN NOT NULL)",
        )
        .execute(&self.pool.writer)
        .await?;
        Ok(())
    }

    async fn current_state(&self) -> Result<Option<(i64, bool)>, MigrationError> {
        let row: Option<(i64, bool)> =
            sqlx::query_as("SELECT version, dirty FROM schema_migrations LIMIT 1")
                .fetch_optional(&self.pool.writer)
                .await?;
        Ok(row)
    }

    async fn record_state(&self, version: i64, dirty: bool) -> Result<(), MigrationError> {
        let mut tx = self.pool.writer.begin().await?;
        sqlx::query("DELETE FROM schema_migrations")
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO schema_migrations (version, dirty) VALUES (?, ?)")
            .bind(version)
            .bind(dirty)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Read every `up` script in `dir`, sorted by version.
///
/// `.down.sql` files and files without the `.up.sql` suffix are skipped.
pub async fn load_migrations(dir: &Path) -> Result<Vec<Migration>, MigrationError> {
    let io_err = |source| MigrationError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut migrations = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.ends_with(DOWN_SUFFIX) {
            continue;
        }
        let Some((version, title)) = parse_file_name(&file_name)? else {
            continue;
        };

        let path = entry.path();
        let sql = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| MigrationError::Io { path, source })?;

        migrations.push(Migration {
            version,
            title,
            sql,
        });
    }

    migrations.sort_by_key(|m| m.version);
    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(MigrationError::DuplicateVersion(pair[0].version));
    }

    Ok(migrations)
}

/// Split `000002_add_index.up.sql` into `(2, "add_index")`.
///
/// Returns `Ok(None)` for files that are not `up` scripts.
fn parse_file_name(file_name: &str) -> Result<Option<(i64, String)>, MigrationError> {
    let Some(stem) = file_name.strip_suffix(UP_SUFFIX) else {
        return Ok(None);
    };

    let (version, title) = stem.split_once('_').unwrap_or((stem, ""));
    let version: i64 = version
        .parse()
        .map_err(|_| MigrationError::InvalidFileName(file_name.to_string()))?;
    if version <= 0 {
        return Err(MigrationError::InvalidFileName(file_name.to_string()));
    }

    Ok(Some((version, title.to_string())))
}
