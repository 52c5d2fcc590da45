//! SQLite dialog repository implementation.
//!
//! Implements `DialogRepository` from `dialogstore-core` using sqlx with split
//! read/write pools. Expects the `dialogs` table created by the bundled
//! migrations.

use dialogstore_core::repository::dialog::DialogRepository;
use dialogstore_types::dialog::{Dialog, PersistedDialog};
use dialogstore_types::error::DialogError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `DialogRepository`.
pub struct SqliteDialogRepository {
    pool: DatabasePool,
}

impl SqliteDialogRepository {
    /// Create a new repository backed by an already migrated pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// The pool this repository writes through.
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

/// Internal row type for mapping SQLite rows to the domain Dialog.
struct DialogRow {
    id: i64,
    user_name: String,
    first_name: String,
    last_name: String,
    chat_id: i64,
    reply: String,
    replied: bool,
}

impl DialogRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_name: row.try_get("userName")?,
            first_name: row.try_get("firstName")?,
            last_name: row.try_get("lastName")?,
            chat_id: row.try_get("chatId")?,
            reply: row.try_get("reply")?,
            replied: row.try_get("replied")?,
        })
    }

    fn into_dialog(self) -> Dialog {
        Dialog::from_persisted(PersistedDialog {
            id: self.id,
            user_name: self.user_name,
            first_name: self.first_name,
            last_name: self.last_name,
            chat_id: self.chat_id,
            reply: self.reply,
            replied: self.replied,
        })
    }
}

/// Map an engine error onto the domain taxonomy.
///
/// Only uniqueness violations have a domain meaning here; everything else is
/// passed through untouched as an opaque storage failure.
fn map_write_error(err: sqlx::Error, id: i64) -> DialogError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DialogError::AlreadyExists(id)
        }
        other => DialogError::storage(other),
    }
}

impl DialogRepository for SqliteDialogRepository {
    async fn create(&self, dialog: &Dialog) -> Result<i64, DialogError> {
        sqlx::query(
            "INSERT INTO dialogs (id, userName, firstName, lastName, chatId, reply, replied)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dialog.id())
        .bind(dialog.user_name())
        .bind(dialog.first_name())
        .bind(dialog.last_name())
        .bind(dialog.chat_id())
        .bind(dialog.reply())
        .bind(dialog.is_replied())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| map_write_error(e, dialog.id()))?;

        Ok(dialog.id())
    }

    async fn get(&self, id: i64) -> Result<Dialog, DialogError> {
        let row = sqlx::query("SELECT * FROM dialogs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(DialogError::storage)?
            .ok_or(DialogError::NotFound(id))?;

        let dialog_row = DialogRow::from_row(&row).map_err(DialogError::storage)?;
        Ok(dialog_row.into_dialog())
    }

    async fn update(&self, dialog: &Dialog) -> Result<(), DialogError> {
        let result = sqlx::query(
            "UPDATE dialogs SET userName = ?, firstName = ?, lastName = ?, reply = ?, replied = ?
             WHERE id = ?",
        )
        .bind(dialog.user_name())
        .bind(dialog.first_name())
        .bind(dialog.last_name())
        .bind(dialog.reply())
        .bind(dialog.is_replied())
        .bind(dialog.id())
        .execute(&self.pool.writer)
        .await
        .map_err(DialogError::storage)?;

        if result.rows_affected() == 0 {
            return Err(DialogError::NotFound(dialog.id()));
        }

        Ok(())
    }

    async fn update_reply(&self, dialog: &Dialog) -> Result<(), DialogError> {
        let result = sqlx::query(
            "UPDATE dialogs SET reply = ?, replied = ?
             WHERE id = ? AND replied = 0",
        )
        .bind(dialog.reply())
        .bind(dialog.is_replied())
        .bind(dialog.id())
        .execute(&self.pool.writer)
        .await
        .map_err(DialogError::storage)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // The guarded write did nothing: either the row is gone or someone
        // replied first. The write has already been refused, so reading
        // afterwards only picks which error to report.
        let still_exists = sqlx::query("SELECT 1 FROM dialogs WHERE id = ?")
            .bind(dialog.id())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(DialogError::storage)?
            .is_some();

        if still_exists {
            Err(DialogError::AlreadyReplied(dialog.id()))
        } else {
            Err(DialogError::NotFound(dialog.id()))
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DialogError> {
        let result = sqlx::query("DELETE FROM dialogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(DialogError::storage)?;

        if result.rows_affected() == 0 {
            return Err(DialogError::NotFound(id));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DialogError> {
        self.pool.ping().await.map_err(DialogError::storage)
    }

    async fn close(self) {
        self.pool.close().await;
        tracing::debug!("sqlite dialog repository closed");
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::sqlite::migrate::MigrationRunner;

    async fn test_repo() -> SqliteDialogRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let pool = DatabasePool::connect(&url).await.unwrap();
        let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        MigrationRunner::new(&pool, migrations).run().await.unwrap();
        SqliteDialogRepository::new(pool)
    }

    fn make_dialog(id: i64) -> Dialog {
        Dialog::from_persisted(PersistedDialog {
            id,
            user_name: "test".to_string(),
            first_name: "t1".to_string(),
            last_name: "t2".to_string(),
            chat_id: 1234,
            reply: "rep".to_string(),
            replied: true,
        })
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = test_repo().await;
        let dialog = make_dialog(12);

        let id = repo.create(&dialog).await.unwrap();
        assert_eq!(id, 12);

        let found = repo.get(12).await.unwrap();
        assert_eq!(found, dialog);
    }

    #[tokio::test]
    async fn test_create_duplicate_keeps_original() {
        let repo = test_repo().await;
        repo.create(&make_dialog(123)).await.unwrap();
        repo.create(&make_dialog(12)).await.unwrap();

        let mut duplicate = PersistedDialog {
            id: 12,
            user_name: "23".to_string(),
            first_name: "t1".to_string(),
            last_name: "t2".to_string(),
            chat_id: 2345,
            reply: String::new(),
            replied: false,
        };
        let err = repo
            .create(&Dialog::from_persisted(duplicate.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, DialogError::AlreadyExists(12)));
        assert_eq!(repo.get(12).await.unwrap(), make_dialog(12));

        duplicate.id = 13;
        let id = repo.create(&Dialog::from_persisted(duplicate)).await.unwrap();
        assert_eq!(id, 13);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = test_repo().await;
        let err = repo.get(404).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(404)));
    }

    #[tokio::test]
    async fn test_update() {
        let repo = test_repo().await;
        let dialog = make_dialog(12);

        let err = repo.update(&dialog).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(12)));

        repo.create(&dialog).await.unwrap();

        let updated = Dialog::from_persisted(PersistedDialog {
            id: 12,
            user_name: "renamed".to_string(),
            first_name: "t1".to_string(),
            last_name: "t2".to_string(),
            chat_id: 1234,
            reply: "rep2".to_string(),
            replied: true,
        });
        repo.update(&updated).await.unwrap();

        assert_eq!(repo.get(12).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_reply_is_conditional() {
        let repo = test_repo().await;
        repo.create(&Dialog::new(5, "u", "f", "l", 9)).await.unwrap();

        let mut first = repo.get(5).await.unwrap();
        let mut second = first.clone();
        first.set_reply("first").unwrap();
        second.set_reply("second").unwrap();

        repo.update_reply(&first).await.unwrap();
        let err = repo.update_reply(&second).await.unwrap_err();
        assert!(matches!(err, DialogError::AlreadyReplied(5)));

        let stored = repo.get(5).await.unwrap();
        assert_eq!(stored.reply(), "first");
        assert!(stored.is_replied());
    }

    #[tokio::test]
    async fn test_update_reply_after_delete() {
        let repo = test_repo().await;
        repo.create(&Dialog::new(5, "u", "f", "l", 9)).await.unwrap();

        let mut dialog = repo.get(5).await.unwrap();
        repo.delete(5).await.unwrap();
        dialog.set_reply("late").unwrap();

        let err = repo.update_reply(&dialog).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(5)));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = test_repo().await;
        let dialog = make_dialog(12);

        let err = repo.delete(12).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(12)));

        repo.create(&dialog).await.unwrap();
        repo.delete(12).await.unwrap();

        let err = repo.get(12).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(12)));
    }

    #[tokio::test]
    async fn test_concurrent_creates_single_winner() {
        let repo = Arc::new(test_repo().await);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(&Dialog::new(77, "u", "f", "l", 1)).await
            }));
        }

        let mut ok = 0;
        let mut exists = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(DialogError::AlreadyExists(77)) => exists += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(exists, 7);
    }

    #[tokio::test]
    async fn test_storage_error_is_opaque() {
        let repo = test_repo().await;
        sqlx::query("DROP TABLE dialogs")
            .execute(&repo.pool().writer)
            .await
            .unwrap();

        let err = repo.create(&make_dialog(1)).await.unwrap_err();
        assert!(matches!(err, DialogError::Storage(_)));
    }

    #[tokio::test]
    async fn test_ping_and_close() {
        let repo = test_repo().await;
        repo.ping().await.unwrap();

        let pool = repo.pool().clone();
        repo.close().await;
        assert!(pool.ping().await.is_err());
    }
}
