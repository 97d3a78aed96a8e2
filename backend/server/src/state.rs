use std::sync::Arc;

use crate::{
    config::Config,
    database::{RestaurantStore, StoreError, SupabaseStore},
    service::AggregationService,
};

pub struct AppState {
    pub config: Config,
    pub service: AggregationService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = SupabaseStore::new(&config)?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Config, store: Arc<dyn RestaurantStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            service: AggregationService::new(store),
        })
    }
}
