//! In-memory dialog repository.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dialogstore_core::repository::dialog::DialogRepository;
use dialogstore_types::dialog::Dialog;
use dialogstore_types::error::DialogError;

/// Thread-safe in-memory dialog repository.
///
/// Each operation touches a single map shard under its lock, which gives the
/// same single-statement atomicity the SQLite adapter gets from the engine.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDialogRepository {
    dialogs: Arc<DashMap<i64, Dialog>>,
}

impl InMemoryDialogRepository {
    /// Creates an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }
}

impl DialogRepository for InMemoryDialogRepository {
    async fn create(&self, dialog: &Dialog) -> Result<i64, DialogError> {
        match self.dialogs.entry(dialog.id()) {
            Entry::Occupied(_) => Err(DialogError::AlreadyExists(dialog.id())),
            Entry::Vacant(slot) => {
                slot.insert(dialog.clone());
                Ok(dialog.id())
            }
        }
    }

    async fn get(&self, id: i64) -> Result<Dialog, DialogError> {
        self.dialogs
            .get(&id)
            .map(|d| d.value().clone())
            .ok_or(DialogError::NotFound(id))
    }

    async fn update(&self, dialog: &Dialog) -> Result<(), DialogError> {
        let mut stored = self
            .dialogs
            .get_mut(&dialog.id())
            .ok_or(DialogError::NotFound(dialog.id()))?;
        *stored = dialog.clone();
        Ok(())
    }

    async fn update_reply(&self, dialog: &Dialog) -> Result<(), DialogError> {
        let mut stored = self
            .dialogs
            .get_mut(&dialog.id())
            .ok_or(DialogError::NotFound(dialog.id()))?;
        if stored.is_replied() {
            return Err(DialogError::AlreadyReplied(dialog.id()));
        }
        *stored = dialog.clone();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DialogError> {
        self.dialogs
            .remove(&id)
            .map(|_| ())
            .ok_or(DialogError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), DialogError> {
        Ok(())
    }

    async fn close(self) {
        self.dialogs.clear();
    }
}
