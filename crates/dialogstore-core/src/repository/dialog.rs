//! Dialog repository trait definition.

use dialogstore_types::dialog::Dialog;
use dialogstore_types::error::DialogError;

/// Repository trait for dialog persistence.
///
/// Implementations live in dialogstore-infra (SQLite, in-memory).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// Every failure is reported through the [`DialogError`] taxonomy.
/// `AlreadyExists` and `NotFound` must come from storage-level signals
/// (uniqueness violation, affected-row count), never from a separate
/// existence query before the write.
///
/// Implementations may be shared across tasks; they do no locking of their
/// own beyond what the engine provides for a single statement.
pub trait DialogRepository: Send + Sync {
    /// Insert a new dialog. Returns the stored id.
    ///
    /// Fails with `AlreadyExists` when a dialog with the same id is stored.
    fn create(
        &self,
        dialog: &Dialog,
    ) -> impl std::future::Future<Output = Result<i64, DialogError>> + Send;

    /// Fetch a full copy of the dialog with the given id.
    fn get(&self, id: i64) -> impl std::future::Future<Output = Result<Dialog, DialogError>> + Send;

    /// Overwrite every mutable field of an existing dialog.
    ///
    /// Fails with `NotFound` when no row matches `dialog.id()`.
    fn update(
        &self,
        dialog: &Dialog,
    ) -> impl std::future::Future<Output = Result<(), DialogError>> + Send;

    /// Persist a reply transition, but only if the stored dialog is still
    /// unreplied.
    ///
    /// Fails with `NotFound` when the dialog no longer exists and with
    /// `AlreadyReplied` when another writer stored a reply first.
    fn update_reply(
        &self,
        dialog: &Dialog,
    ) -> impl std::future::Future<Output = Result<(), DialogError>> + Send;

    /// Permanently delete a dialog by id.
    fn delete(&self, id: i64) -> impl std::future::Future<Output = Result<(), DialogError>> + Send;

    /// Check that the underlying store is reachable.
    fn ping(&self) -> impl std::future::Future<Output = Result<(), DialogError>> + Send;

    /// Release the underlying connection.
    ///
    /// Must only be called once no other operation is in flight; callers
    /// give up the repository, so it cannot be used or closed again.
    fn close(self) -> impl std::future::Future<Output = ()> + Send
    where
        Self: Sized;
}
