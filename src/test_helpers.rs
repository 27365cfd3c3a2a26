use std::sync::Arc;

use axum::Router;

use crate::{db::memory_store::MemoryItemStore, routes::router, state::AppState};

/// State over a fresh in-memory store; shared across requests in a test.
pub fn test_state() -> Arc<AppState> {
    AppState::new(Arc::new(MemoryItemStore::new()))
}

pub fn test_router() -> Router {
    router(test_state())
}
