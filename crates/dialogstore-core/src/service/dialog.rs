//! Dialog service.
//!
//! Validates input, applies the entity's reply transition and delegates
//! persistence to a [`DialogRepository`]. Holds no dialog state between
//! calls; every operation works on a fresh copy read from the repository.

use dialogstore_types::dialog::{CreateDialogRequest, Dialog};
use dialogstore_types::error::DialogError;

use crate::repository::dialog::DialogRepository;

/// Service orchestrating the dialog lifecycle.
///
/// Generic over the repository trait to maintain clean architecture --
/// dialogstore-core never depends on dialogstore-infra.
pub struct DialogService<R: DialogRepository> {
    repo: R,
}

impl<R: DialogRepository> DialogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create an Unreplied dialog. Returns the stored id.
    ///
    /// Rejects non-positive `id` or `chat_id` with `InvalidId` before the
    /// repository is touched. A duplicate id surfaces as `AlreadyExists`.
    #[tracing::instrument(skip(self, request), fields(id = request.id, chat_id = request.chat_id))]
    pub async fn create(&self, request: CreateDialogRequest) -> Result<i64, DialogError> {
        if !request.has_valid_ids() {
            return Err(DialogError::InvalidId {
                id: request.id,
                chat_id: request.chat_id,
            });
        }

        let dialog = request.into_dialog();
        let id = self.repo.create(&dialog).await?;
        tracing::debug!("dialog created");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Dialog, DialogError> {
        self.repo.get(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), DialogError> {
        self.repo.delete(id).await?;
        tracing::debug!("dialog deleted");
        Ok(())
    }

    /// Store the operator's reply on a dialog. Returns the replied dialog.
    ///
    /// Entity errors (`EmptyMessage`, `AlreadyReplied`) are returned without
    /// any write. The write itself is conditional on the stored dialog still
    /// being unreplied, so a concurrent reply makes this call fail with
    /// `AlreadyReplied` instead of overwriting it, and a concurrent delete
    /// surfaces as `NotFound`.
    #[tracing::instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn set_reply(&self, id: i64, message: &str) -> Result<Dialog, DialogError> {
        let mut dialog = self.repo.get(id).await?;
        dialog.set_reply(message)?;
        self.repo.update_reply(&dialog).await?;
        tracing::debug!("reply stored");
        Ok(dialog)
    }

    /// Check that the backing store is reachable.
    pub async fn health(&self) -> Result<(), DialogError> {
        self.repo.ping().await
    }

    /// Release the repository's connection. Call once, at shutdown.
    pub async fn end_session(self) {
        self.repo.close().await;
        tracing::info!("dialog session ended");
    }
}
