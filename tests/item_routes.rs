use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use sea_orm::{ConnectOptions, Database};
use serde_json::json;
use tower::ServiceExt;

use item_server::{
    config::AppConfig,
    db::sql_store::SqlItemStore,
    routes::router,
    state::AppState,
    test_helpers::{test_router, test_state},
};

async fn send(state: &Arc<AppState>, request: Request<Body>) -> axum::response::Response {
    router(state.clone()).oneshot(request).await.unwrap()
}

async fn json_response(
    state: &Arc<AppState>,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = send(state, request).await;
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn post_item(payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/items")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get_uri(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create_item(state: &Arc<AppState>, payload: serde_json::Value) -> serde_json::Value {
    let (status, item) = json_response(state, post_item(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    item
}

#[tokio::test]
async fn item_crud_flow() {
    let state = test_state();

    let item = create_item(
        &state,
        json!({ "name": "  Write report  ", "description": "for Friday" }),
    )
    .await;
    assert_eq!(item["name"].as_str(), Some("Write report"));
    assert_eq!(item["completed"].as_bool(), Some(false));
    assert!(item["due_date"].is_null());
    let id = item["id"].as_i64().unwrap();

    let (status, fetched) = json_response(&state, get_uri(&format!("/items/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, item);

    let (status, updated) = json_response(
        &state,
        Request::builder()
            .method("PUT")
            .uri(format!("/items/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "name": "Write report v2",
                    "completed": 1,
                    "due_date": "2026-09-01T09:00:00Z"
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"].as_str(), Some("Write report v2"));
    assert_eq!(updated["completed"].as_bool(), Some(true));
    assert!(updated["description"].is_null());
    assert_eq!(updated["created_at"], item["created_at"]);

    let (status, toggled) = json_response(
        &state,
        Request::builder()
            .method("PATCH")
            .uri(format!("/items/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["completed"].as_bool(), Some(false));
    assert_eq!(toggled["name"].as_str(), Some("Write report v2"));

    let (status, deleted) = json_response(
        &state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/items/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"].as_str(), Some("Item deleted successfully"));
    assert_eq!(deleted["id"].as_i64(), Some(id));

    let (status, error) = json_response(
        &state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/items/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"].as_str(), Some("Item not found"));

    let (status, error) = json_response(&state, get_uri(&format!("/items/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"].as_str(), Some("Item not found"));
}

#[tokio::test]
async fn validation_errors_use_contract_messages() {
    let state = test_state();

    let (status, error) = json_response(&state, post_item(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"].as_str(), Some("Item name is required"));

    let (status, error) = json_response(&state, post_item(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"].as_str(), Some("Item name is required"));

    let (status, _) = json_response(&state, post_item(json!({ "name": "a".repeat(200) }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) =
        json_response(&state, post_item(json!({ "name": "a".repeat(201) }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error["error"].as_str(),
        Some("Item name must not exceed 200 characters")
    );

    let (status, error) = json_response(
        &state,
        post_item(json!({ "name": "x", "due_date": "someday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"].as_str(), Some("Invalid due date format"));
}

#[tokio::test]
async fn replace_missing_item_is_not_found_even_with_invalid_body() {
    let state = test_state();

    for payload in [json!({ "name": "   " }), json!({ "name": "x", "due_date": "someday" })] {
        let (status, error) = json_response(
            &state,
            Request::builder()
                .method("PUT")
                .uri("/items/424242")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["error"].as_str(), Some("Item not found"));
    }
}

#[tokio::test]
async fn non_numeric_ids_fail_fast() {
    let state = test_state();

    for request in [
        get_uri("/items/abc"),
        Request::builder()
            .method("PUT")
            .uri("/items/abc")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "name": "x" }).to_string()))
            .unwrap(),
        Request::builder()
            .method("PATCH")
            .uri("/items/abc")
            .body(Body::empty())
            .unwrap(),
        Request::builder()
            .method("DELETE")
            .uri("/items/abc")
            .body(Body::empty())
            .unwrap(),
    ] {
        let (status, error) = json_response(&state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"].as_str(), Some("Valid item ID is required"));
    }
}

#[tokio::test]
async fn list_sorts_filters_and_searches() {
    let state = test_state();

    create_item(
        &state,
        json!({ "name": "b", "due_date": "2024-01-01T00:00:00Z" }),
    )
    .await;
    create_item(&state, json!({ "name": "A" })).await;
    let done = create_item(
        &state,
        json!({ "name": "c task", "due_date": "2024-06-01T00:00:00Z" }),
    )
    .await;
    let done_id = done["id"].as_i64().unwrap();
    let response = send(
        &state,
        Request::builder()
            .method("PATCH")
            .uri(format!("/items/{done_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let names = |items: &serde_json::Value| -> Vec<String> {
        items
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, items) = json_response(&state, get_uri("/items?sort=name&order=asc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&items), ["A", "b", "c task"]);

    // missing due dates land last in both directions
    let (status, items) = json_response(&state, get_uri("/items?sort=date&order=asc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&items), ["b", "c task", "A"]);

    let (status, items) = json_response(&state, get_uri("/items?sort=date&order=desc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&items), ["c task", "b", "A"]);

    let (status, items) = json_response(&state, get_uri("/items?filter=complete")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&items), ["c task"]);

    let (status, items) =
        json_response(&state, get_uri("/items?filter=incomplete&search=TASK")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(names(&items).is_empty());

    let (status, items) = json_response(&state, get_uri("/items?search=task")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&items), ["c task"]);

    // unrecognized values degrade to defaults instead of erroring
    let (status, items) =
        json_response(&state, get_uri("/items?filter=done&sort=priority&order=up")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn health_probe_responds() {
    let response = test_router().oneshot(get_uri("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"].as_bool(), Some(true));
}

async fn postgres_state() -> Arc<AppState> {
    let cfg = AppConfig::from_env().expect("load app config");
    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect to database");
    db.get_schema_registry("item_server::db::entities::*")
        .sync(&db)
        .await
        .expect("sync schema");

    AppState::new(Arc::new(SqlItemStore::new(db)))
}

#[tokio::test]
#[ignore = "requires Postgres database"]
async fn item_flow_against_postgres() {
    let state = postgres_state().await;

    let item = create_item(&state, json!({ "name": "postgres round trip" })).await;
    let id = item["id"].as_i64().unwrap();

    let (status, fetched) = json_response(&state, get_uri(&format!("/items/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"].as_str(), Some("postgres round trip"));

    let (status, deleted) = json_response(
        &state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/items/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"].as_i64(), Some(id));
}
