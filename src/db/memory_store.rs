use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::entities::item;
use super::store::{ItemChanges, ItemStore, NewItem, StoreResult};
use crate::query::{SortKey, SortOrder};

/// Process-lifetime store. The test double for `SqlItemStore`, with the same
/// ordering contract: due-date sort sinks missing dates in both directions,
/// name sort compares lowercased, ties break by id ascending.
pub struct MemoryItemStore {
    inner: Mutex<Inner>,
}

struct Inner {
    items: Vec<item::Model>,
    next_id: i64,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, new: NewItem) -> StoreResult<item::Model> {
        let mut inner = self.lock();
        let now = Utc::now().fixed_offset();
        let model = item::Model {
            id: inner.next_id,
            name: new.name,
            description: new.description,
            completed: false,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        };
        // ids are never reused, even after deletion
        inner.next_id += 1;
        inner.items.push(model.clone());
        Ok(model)
    }

    async fn fetch(&self, id: i64) -> StoreResult<Option<item::Model>> {
        let inner = self.lock();
        Ok(inner.items.iter().find(|item| item.id == id).cloned())
    }

    async fn fetch_sorted(
        &self,
        sort: SortKey,
        order: SortOrder,
    ) -> StoreResult<Vec<item::Model>> {
        let mut items = self.lock().items.clone();
        items.sort_by(|a, b| compare(a, b, sort, order));
        Ok(items)
    }

    async fn replace(&self, id: i64, changes: ItemChanges) -> StoreResult<Option<item::Model>> {
        let mut inner = self.lock();
        let Some(item) = inner.items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        item.name = changes.name;
        item.description = changes.description;
        item.completed = changes.completed;
        item.due_date = changes.due_date;
        item.updated_at = Utc::now().fixed_offset();
        Ok(Some(item.clone()))
    }

    async fn toggle(&self, id: i64) -> StoreResult<Option<item::Model>> {
        let mut inner = self.lock();
        let Some(item) = inner.items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        item.completed = !item.completed;
        item.updated_at = Utc::now().fixed_offset();
        Ok(Some(item.clone()))
    }

    async fn remove(&self, id: i64) -> StoreResult<bool> {
        let mut inner = self.lock();
        let before = inner.items.len();
        inner.items.retain(|item| item.id != id);
        Ok(inner.items.len() < before)
    }
}

fn compare(a: &item::Model, b: &item::Model, sort: SortKey, order: SortOrder) -> Ordering {
    let primary = match sort {
        SortKey::Date => match (&a.due_date, &b.due_date) {
            (None, None) => Ordering::Equal,
            // missing due dates sink to the end regardless of direction
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(left), Some(right)) => directed(left.cmp(right), order),
        },
        SortKey::Name => directed(a.name.to_lowercase().cmp(&b.name.to_lowercase()), order),
        SortKey::Created => directed(a.created_at.cmp(&b.created_at), order),
    };
    primary.then(a.id.cmp(&b.id))
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}
