//! Todo handlers
//!
//! Each request records exactly one statistics event: its operation category
//! on success, `error` on any failure.

use super::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use todo_core::{EventCategory, NewTodo, TodoError, TodoItem, TodoPatch};

fn tally<T>(
    state: &AppState,
    category: EventCategory,
    result: Result<T, TodoError>,
) -> Result<T, ApiError> {
    match result {
        Ok(value) => {
            state.stats.record(category);
            Ok(value)
        }
        Err(e) => {
            state.stats.record(EventCategory::Error);
            Err(e.into())
        }
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, TodoError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| TodoError::Validation(rejection.body_text()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let result = state.todos.list().await;
    tally(&state, EventCategory::Read, result).map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    let result = match body(payload) {
        Ok(new) => state.todos.create(new).await,
        Err(e) => Err(e),
    };
    tally(&state, EventCategory::Create, result).map(|item| (StatusCode::CREATED, Json(item)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>, ApiError> {
    let result = state.todos.get(&id).await;
    tally(&state, EventCategory::Read, result).map(Json)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<TodoItem>, ApiError> {
    let result = match body(payload) {
        Ok(patch) => state.todos.update(&id, patch).await,
        Err(e) => Err(e),
    };
    tally(&state, EventCategory::Update, result).map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = state.todos.delete(&id).await;
    tally(&state, EventCategory::Delete, result).map(|()| StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::services::{StatisticsAccumulator, TodoService};
    use crate::storage::{MemoryTodoStore, StalledStore};
    use crate::{build_router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use todo_core::{EventCategory, TodoItem, TodoStore};
    use tower::ServiceExt;

    fn app_with(store: Arc<dyn TodoStore>, timeout: Duration) -> (Router, AppState) {
        let state = AppState {
            todos: Arc::new(TodoService::new(store, timeout)),
            stats: Arc::new(StatisticsAccumulator::new(Duration::from_secs(60))),
        };
        (build_router(state.clone()), state)
    }

    fn app() -> (Router, AppState) {
        app_with(Arc::new(MemoryTodoStore::new()), Duration::from_secs(1))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(text) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(text.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_todo_lifecycle() {
        let (app, state) = app();

        let (status, created) =
            send(&app, Method::POST, "/todos", Some(r#"{"title":"buy milk"}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/todos/{id}");

        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], json!(id));
        assert_eq!(fetched["title"], json!("buy milk"));
        assert_eq!(fetched["completed"], json!(false));

        let (status, updated) =
            send(&app, Method::PUT, &uri, Some(r#"{"completed":true}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], json!(true));
        assert_eq!(updated["title"], json!("buy milk"));

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, missing) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["kind"], json!("NotFound"));

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let stats = state.stats.snapshot();
        assert_eq!(stats.count(EventCategory::Create), 1);
        assert_eq!(stats.count(EventCategory::Read), 1);
        assert_eq!(stats.count(EventCategory::Update), 1);
        assert_eq!(stats.count(EventCategory::Delete), 1);
        assert_eq!(stats.count(EventCategory::Error), 2);
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let (app, state) = app();

        let (status, body) = send(&app, Method::POST, "/todos", Some(r#"{"title":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], json!("ValidationError"));
        assert!(!body["message"].as_str().unwrap().is_empty());

        let stats = state.stats.snapshot();
        assert_eq!(stats.count(EventCategory::Error), 1);
        assert_eq!(stats.total(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let (app, state) = app();

        let (status, body) = send(&app, Method::POST, "/todos", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], json!("ValidationError"));
        assert_eq!(state.stats.snapshot().count(EventCategory::Error), 1);
    }

    #[tokio::test]
    async fn test_list_returns_all_in_creation_order() {
        let (app, state) = app();
        for title in ["a", "b", "c"] {
            let payload = json!({ "title": title }).to_string();
            send(&app, Method::POST, "/todos", Some(&payload)).await;
        }

        let (status, listed) = send(&app, Method::GET, "/todos", None).await;
        assert_eq!(status, StatusCode::OK);
        let items: Vec<TodoItem> = serde_json::from_value(listed).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items
            .windows(2)
            .all(|w| (w[0].created_at, &w[0].id) < (w[1].created_at, &w[1].id)));

        let stats = state.stats.snapshot();
        assert_eq!(stats.count(EventCategory::Create), 3);
        assert_eq!(stats.count(EventCategory::Read), 1);
    }

    #[tokio::test]
    async fn test_patch_with_blank_title_keeps_item() {
        let (app, _state) = app();
        let (_, created) = send(&app, Method::POST, "/todos", Some(r#"{"title":"keep"}"#)).await;
        let uri = format!("/todos/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::PATCH, &uri, Some(r#"{"title":"  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched["title"], json!("keep"));
    }

    #[tokio::test]
    async fn test_stats_and_health_are_not_counted() {
        let (app, state) = app();

        let (status, health) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["storage"], json!("memory"));

        let (status, stats) = send(&app, Method::GET, "/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["counts"]["read"], json!(0));
        assert_eq!(state.stats.snapshot().total(), 0);
    }

    #[tokio::test]
    async fn test_storage_timeout_is_unavailable() {
        let (app, state) = app_with(Arc::new(StalledStore), Duration::from_millis(20));

        let (status, body) = send(&app, Method::GET, "/todos/some-id", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], json!("StorageUnavailable"));
        assert!(!body["message"].as_str().unwrap().is_empty());

        let stats = state.stats.snapshot();
        assert_eq!(stats.count(EventCategory::Error), 1);
        assert_eq!(stats.total(), 1);
    }
}
