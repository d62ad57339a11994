use std::sync::Arc;

use crate::config::Config;
use crate::repositories::{MongoStore, Store, StoreInitError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState backed by MongoDB
    pub async fn new(config: Config) -> Result<Self, StoreInitError> {
        let store = MongoStore::connect(&config).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Create AppState with a custom store (for testing)
    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Self {
        Self { store, config }
    }
}
