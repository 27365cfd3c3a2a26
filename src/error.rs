use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Everything an item operation can fail with. The display strings double as
/// the HTTP error bodies, so they are part of the API contract.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item name is required")]
    NameRequired,
    #[error("Item name must not exceed 200 characters")]
    NameTooLong,
    #[error("Invalid due date format")]
    InvalidDueDate,
    #[error("Valid item ID is required")]
    InvalidId,
    #[error("Item not found")]
    NotFound,
    #[error("Internal server error")]
    Store(#[from] StoreError),
}

impl ItemError {
    pub fn status(&self) -> StatusCode {
        match self {
            ItemError::NameRequired
            | ItemError::NameTooLong
            | ItemError::InvalidDueDate
            | ItemError::InvalidId => StatusCode::BAD_REQUEST,
            ItemError::NotFound => StatusCode::NOT_FOUND,
            ItemError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        if let ItemError::Store(err) = &self {
            tracing::error!("store error: {err}");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
