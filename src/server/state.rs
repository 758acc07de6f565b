//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::convos::core::config::StorageConfig;
use crate::convos::core::errors::ConvoResult;
use crate::convos::repository::{ConvoStore, SqliteConvoStore};
use crate::convos::storage::StorageGateway;

/// Shared application state.
pub struct AppState {
    /// Convo repository.
    pub convos: Arc<dyn ConvoStore>,
}

impl AppState {
    /// Open storage and build the state around a `SQLite` repository.
    ///
    /// # Errors
    /// Returns an error if the storage gateway cannot be initialized.
    pub async fn new(config: &StorageConfig) -> ConvoResult<Arc<Self>> {
        let gateway = Arc::new(StorageGateway::open(config.clone()).await?);
        Ok(Self::from_gateway(gateway))
    }

    /// Build the state on an already constructed gateway.
    #[must_use]
    pub fn from_gateway(gateway: Arc<StorageGateway>) -> Arc<Self> {
        Self::with_store(Arc::new(SqliteConvoStore::new(gateway)))
    }

    /// Build the state around any repository implementation.
    #[must_use]
    pub fn with_store(convos: Arc<dyn ConvoStore>) -> Arc<Self> {
        Arc::new(Self { convos })
    }
}
