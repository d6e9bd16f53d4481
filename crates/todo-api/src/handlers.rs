use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{NewTodo, Todo};

use crate::error::{ApiError, SuccessResponse};
use crate::AppState;

/// GET /health
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// GET /api/todos
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.service.list().await?;
    Ok(Json(todos))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(new_todo) = payload?;
    let todo = state.service.create(new_todo).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// PATCH /api/todos/:id
pub async fn complete_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    state.service.complete_by_id(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/todos/:id
pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    state.service.delete_by_id(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
