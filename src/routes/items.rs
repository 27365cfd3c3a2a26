use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    db::entities::item,
    error::ItemError,
    query::ListParams,
    services::item_service::{self, ItemInput},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// JSON `true` and the number `1` mean completed; every other value
    /// (false, 0, strings, null, absent) means not completed.
    #[serde(default, deserialize_with = "completed_flag")]
    pub completed: bool,
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: i64,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item)
                .put(replace_item)
                .patch(toggle_item)
                .delete(delete_item),
        )
        .with_state(state)
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ItemResponse>>, ItemError> {
    let items = item_service::list(state.store.as_ref(), &params).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ItemError> {
    let id = parse_id(&id)?;
    let item = item_service::get(state.store.as_ref(), id).await?;
    Ok(Json(item.into()))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ItemError> {
    let input = ItemInput {
        name: body.name,
        description: body.description,
        completed: false,
        due_date: body.due_date,
    };
    let item = item_service::create(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

async fn replace_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ReplaceItemRequest>,
) -> Result<Json<ItemResponse>, ItemError> {
    let id = parse_id(&id)?;
    let input = ItemInput {
        name: body.name,
        description: body.description,
        completed: body.completed,
        due_date: body.due_date,
    };
    let item = item_service::replace(state.store.as_ref(), id, input).await?;
    Ok(Json(item.into()))
}

async fn toggle_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ItemError> {
    let id = parse_id(&id)?;
    let item = item_service::toggle(state.store.as_ref(), id).await?;
    Ok(Json(item.into()))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ItemError> {
    let id = parse_id(&id)?;
    let id = item_service::delete(state.store.as_ref(), id).await?;
    Ok(Json(DeleteResponse {
        message: "Item deleted successfully",
        id,
    }))
}

/// Ids arrive as raw path segments so that non-numeric input maps to the
/// item error body instead of an extractor rejection. Fails before any store
/// access.
fn parse_id(raw: &str) -> Result<i64, ItemError> {
    raw.trim().parse::<i64>().map_err(|_| ItemError::InvalidId)
}

fn completed_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(&value, serde_json::Value::Bool(true)) || value.as_u64() == Some(1))
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            completed: model.completed,
            due_date: model.due_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
