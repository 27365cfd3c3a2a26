use std::sync::Arc;

use crate::db::store::ItemStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}
