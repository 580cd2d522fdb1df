use std::sync::Arc;
use std::time::Instant;

use crate::auth::{TokenError, TokenIssuer};
use crate::catalog::ServiceCatalog;
use crate::config::AppConfig;
use crate::database::{MemoryStore, Store};

/// Shared handles passed to every handler through axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub catalog: Arc<ServiceCatalog>,
    pub tokens: TokenIssuer,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig, catalog: ServiceCatalog) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::from_config(&config.security)?;
        Ok(Self {
            store,
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            tokens,
            started_at: Instant::now(),
        })
    }

    /// Fresh in-memory store with the built-in catalog.
    pub fn in_memory(config: AppConfig) -> Result<Self, TokenError> {
        Self::new(Arc::new(MemoryStore::new()), config, ServiceCatalog::default())
    }
}
