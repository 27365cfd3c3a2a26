use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, NullOrdering, SimpleExpr};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::entities::item;
use super::entities::prelude::Item;
use super::store::{ItemChanges, ItemStore, NewItem, StoreResult};
use crate::query::{SortKey, SortOrder};

/// sea-orm backed store. Sorting is pushed into SQL; the observable ordering
/// matches `MemoryItemStore` exactly.
#[derive(Clone)]
pub struct SqlItemStore {
    db: DatabaseConnection,
}

impl SqlItemStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for SqlItemStore {
    async fn insert(&self, new: NewItem) -> StoreResult<item::Model> {
        let model = item::ActiveModel {
            name: Set(new.name),
            description: Set(new.description),
            completed: Set(false),
            due_date: Set(new.due_date),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn fetch(&self, id: i64) -> StoreResult<Option<item::Model>> {
        Ok(Item::find_by_id(id).one(&self.db).await?)
    }

    async fn fetch_sorted(
        &self,
        sort: SortKey,
        order: SortOrder,
    ) -> StoreResult<Vec<item::Model>> {
        let direction: sea_orm::Order = order.into();
        let query = match sort {
            SortKey::Date => Item::find().order_by_with_nulls(
                item::Column::DueDate,
                direction,
                NullOrdering::Last,
            ),
            SortKey::Name => {
                let lowered: SimpleExpr = Func::lower(Expr::col(item::Column::Name)).into();
                Item::find().order_by(lowered, direction)
            }
            SortKey::Created => Item::find().order_by(item::Column::CreatedAt, direction),
        };
        Ok(query.order_by_asc(item::Column::Id).all(&self.db).await?)
    }

    async fn replace(&self, id: i64, changes: ItemChanges) -> StoreResult<Option<item::Model>> {
        let Some(existing) = Item::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active: item::ActiveModel = existing.into();
        active.name = Set(changes.name);
        active.description = Set(changes.description);
        active.completed = Set(changes.completed);
        active.due_date = Set(changes.due_date);
        active.updated_at = Set(Utc::now().fixed_offset());
        match active.update(&self.db).await {
            Ok(model) => Ok(Some(model)),
            Err(err) => absent_if_stale(err),
        }
    }

    async fn toggle(&self, id: i64) -> StoreResult<Option<item::Model>> {
        let Some(existing) = Item::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let completed = existing.completed;
        let mut active: item::ActiveModel = existing.into();
        active.completed = Set(!completed);
        active.updated_at = Set(Utc::now().fixed_offset());
        match active.update(&self.db).await {
            Ok(model) => Ok(Some(model)),
            Err(err) => absent_if_stale(err),
        }
    }

    async fn remove(&self, id: i64) -> StoreResult<bool> {
        let result = Item::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

/// A row deleted between the fetch and the update surfaces as
/// `RecordNotUpdated`; report it as absent, not a store failure.
fn absent_if_stale(err: sea_orm::DbErr) -> StoreResult<Option<item::Model>> {
    match err {
        sea_orm::DbErr::RecordNotUpdated => Ok(None),
        other => Err(other.into()),
    }
}
