use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use domain::{NewTodo, Todo, TodoId};
use infrastructure::{InMemoryTodoStore, StoreError, TodoStore};
use shared::Config;
use todo_api::{app, app_with_state, AppState};
use tower::ServiceExt; // for `oneshot`

fn setup() -> (Arc<InMemoryTodoStore>, Router) {
    let store = Arc::new(InMemoryTodoStore::recording());
    let app = app_with_state(AppState::new(store.clone()));
    (store, app)
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// 常に失敗するストア
struct UnavailableStore;

#[async_trait]
impl TodoStore for UnavailableStore {
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn insert(&self, _new_todo: NewTodo) -> Result<Todo, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn mark_completed(&self, _id: &TodoId) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn delete(&self, _id: &TodoId) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

#[tokio::test]
async fn get_health_returns_ok() {
    let (_, app) = setup();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn list_todos_on_empty_collection_returns_empty_array() {
    let (_, app) = setup();

    let response = app
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn todo_lifecycle_create_complete_list_delete() {
    let (_, app) = setup();

    // 作成
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/todos", r#"{"body":"buy milk"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["body"], "buy milk");
    assert_eq!(created["completed"], false);

    // 完了
    let response = app
        .clone()
        .oneshot(empty_request("PATCH", &format!("/api/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "success": true })
    );

    // 一覧
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!([{ "id": id, "body": "buy milk", "completed": true }])
    );

    // 削除
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "success": true })
    );

    // 削除後の一覧
    let response = app
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn create_todo_with_empty_body_returns_400_without_store_write() {
    let (store, app) = setup();

    for payload in [r#"{"body":""}"#, "{}"] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/todos", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Body is required" })
        );
    }
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn create_todo_with_malformed_json_returns_400() {
    let (store, app) = setup();

    let response = app
        .oneshot(json_request("POST", "/api/todos", r#"{"body": "#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Could not parse JSON"));
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn create_todo_ignores_client_supplied_completed() {
    let (_, app) = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/todos",
            r#"{"body":"already done?","completed":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["completed"], false);
}

#[tokio::test]
async fn invalid_id_returns_400_without_store_interaction() {
    let (store, app) = setup();

    for method in ["PATCH", "DELETE"] {
        let response = app
            .clone()
            .oneshot(empty_request(method, "/api/todos/not-a-valid-id"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Invalid ID" })
        );
    }
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn undecodable_path_id_returns_json_invalid_id() {
    let (store, app) = setup();

    for method in ["PATCH", "DELETE"] {
        let response = app
            .clone()
            .oneshot(empty_request(method, "/api/todos/%FF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Invalid ID" })
        );
    }
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn unknown_but_well_formed_id_is_success() {
    let (_, app) = setup();
    let id = TodoId::new();

    for method in ["PATCH", "DELETE"] {
        let response = app
            .clone()
            .oneshot(empty_request(method, &format!("/api/todos/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": true })
        );
    }

    // 完了操作で Todo が作られていないこと
    let response = app
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn store_failures_return_500_with_cause() {
    let app = app_with_state(AppState::new(Arc::new(UnavailableStore)));
    let id = TodoId::new();

    let cases = [
        (
            empty_request("GET", "/api/todos"),
            "Failed to fetch todos: connection refused",
        ),
        (
            json_request("POST", "/api/todos", r#"{"body":"x"}"#),
            "Failed to create todo: connection refused",
        ),
        (
            empty_request("PATCH", &format!("/api/todos/{id}")),
            "Failed to update todo: connection refused",
        ),
        (
            empty_request("DELETE", &format!("/api/todos/{id}")),
            "Failed to delete todo: connection refused",
        ),
    ];

    for (request, expected) in cases {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": expected })
        );
    }
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (_, app) = setup();

    let response = app
        .oneshot(empty_request("GET", "/api/nothing"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Not found" })
    );
}

#[tokio::test]
async fn development_app_allows_configured_cors_origin() {
    let config = Config::from_lookup(|key| match key {
        "CORS_ALLOWED_ORIGIN" => Some("http://localhost:5173".to_string()),
        _ => None,
    })
    .unwrap();
    let app = app(
        AppState::new(Arc::new(InMemoryTodoStore::new())),
        &config,
    )
    .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/todos")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn production_app_serves_static_files_for_unmatched_routes() {
    let static_dir = std::env::temp_dir().join(format!("todo-api-static-{}", TodoId::new()));
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>todos</h1>").unwrap();

    let dir = static_dir.to_string_lossy().to_string();
    let config = Config::from_lookup(|key| match key {
        "ENV" => Some("production".to_string()),
        "STATIC_DIR" => Some(dir.clone()),
        _ => None,
    })
    .unwrap();
    let app = app(
        AppState::new(Arc::new(InMemoryTodoStore::new())),
        &config,
    )
    .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>todos</h1>");

    // API は静的配信より優先される
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // `/api` 配下の未定義パスは静的配信に落ちず JSON の 404
    let response = app
        .oneshot(empty_request("GET", "/api/nothing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Not found" })
    );

    std::fs::remove_dir_all(&static_dir).unwrap();
}
