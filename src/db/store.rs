use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use thiserror::Error;

use super::entities::item;
use crate::query::{SortKey, SortOrder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A validated, not-yet-persisted item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTimeWithTimeZone>,
}

/// Full replacement payload for an existing item.
#[derive(Debug, Clone)]
pub struct ItemChanges {
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTimeWithTimeZone>,
}

/// Persistence seam for items. Handlers and the service layer only see this
/// trait, so the backing store can be swapped (Postgres in production, the
/// in-memory store in tests) without touching validation or pipeline logic.
///
/// Every method is atomic from the caller's perspective: it either applies
/// fully or fails before any mutation. Assigned ids are unique for the life
/// of the store and never reused after deletion.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert(&self, item: NewItem) -> StoreResult<item::Model>;

    async fn fetch(&self, id: i64) -> StoreResult<Option<item::Model>>;

    /// All rows ordered by `sort`/`order`. The ordering contract: due-date
    /// sort puts rows without a due date last in both directions, name sort
    /// compares lowercased, and ties always break by id ascending (insertion
    /// order).
    async fn fetch_sorted(
        &self,
        sort: SortKey,
        order: SortOrder,
    ) -> StoreResult<Vec<item::Model>>;

    /// Overwrites name, description, completed and due_date, refreshing
    /// `updated_at`. Returns `None` when the id matches no row.
    async fn replace(&self, id: i64, changes: ItemChanges) -> StoreResult<Option<item::Model>>;

    /// Flips `completed` and refreshes `updated_at`, leaving every other
    /// field untouched.
    async fn toggle(&self, id: i64) -> StoreResult<Option<item::Model>>;

    /// Returns whether a row was deleted.
    async fn remove(&self, id: i64) -> StoreResult<bool>;
}
