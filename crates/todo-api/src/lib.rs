//! Todo リストの HTTP API（axum）
//!
//! `TodoService` が一覧・作成・完了・削除の 4 操作を Todo コレクションに対応付け、
//! ルータがそれを `/api/todos` 以下に公開します。

use std::sync::Arc;

use infrastructure::TodoStore;

pub mod error;
pub mod handlers;
pub mod router;
pub mod service;

pub use error::{ApiError, ErrorResponse, SuccessResponse};
pub use router::{app, app_with_state};
pub use service::TodoService;

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TodoService>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            service: Arc::new(TodoService::new(store)),
        }
    }
}
