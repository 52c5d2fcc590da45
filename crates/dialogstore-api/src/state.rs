//! Application state wiring the dialog service to its store.
//!
//! The service is generic over its repository; AppState pins it to
//! [`DialogStore`], which dispatches to whichever engine the configuration
//! selects.

use std::sync::Arc;

use dialogstore_core::service::dialog::DialogService;
use dialogstore_infra::store::DialogStore;
use dialogstore_types::config::DatabaseConfig;

/// Concrete type alias for the service generic pinned to the store.
pub type ConcreteDialogService = DialogService<DialogStore>;

/// Shared state handed to every RPC handler.
#[derive(Clone)]
pub struct AppState {
    pub dialog_service: Arc<ConcreteDialogService>,
}

impl AppState {
    /// Open the configured store (running migrations for SQLite) and wire the
    /// service on top of it.
    pub async fn init(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let store = DialogStore::open(config).await?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: DialogStore) -> Self {
        Self {
            dialog_service: Arc::new(DialogService::new(store)),
        }
    }
}
