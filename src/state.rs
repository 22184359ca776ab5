use crate::cache::ReportCache;
use crate::config::Settings;
use crate::storage::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Store,
    pub cache: ReportCache,
}

impl AppState {
    pub fn new(settings: Settings, store: Store) -> Self {
        Self {
            cache: ReportCache::new(settings.cache_ttl_secs),
            settings: Arc::new(settings),
            store,
        }
    }
}
