use std::sync::Arc;

use nw_adapters::FetchManager;
use nw_core::Storage;

use crate::cache::ResponseCache;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub fetcher: Arc<FetchManager>,
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let fetcher = Arc::new(FetchManager::new(storage.clone()));
        Self {
            storage,
            fetcher,
            cache: ResponseCache::new(),
        }
    }
}
