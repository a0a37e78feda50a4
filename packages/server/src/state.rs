use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{CategoryService, PostService};
use crate::store::ContentStore;

/// Process-wide handles, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(
            self.store.as_ref(),
            &self.config.content.required_locales,
        )
    }

    pub fn posts(&self) -> PostService<'_> {
        PostService::new(self.store.as_ref(), &self.config.content)
    }
}
