use axum::extract::Request;
use axum::http::header::{InvalidHeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch};
use axum::Router;
use shared::Config;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::AppState;

/// テスト用: API ルートと JSON の 404 だけを持つルータ
pub fn app_with_state(state: AppState) -> Router {
    api_routes(state)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_request))
}

/// 本番用のルータを構築する。
///
/// - production: `/api` 以外のパスはビルド済みクライアント（`static_dir`）から配信
/// - それ以外: 開発用クライアントのオリジンに CORS を許可
pub fn app(state: AppState, config: &Config) -> Result<Router, InvalidHeaderValue> {
    let router = api_routes(state);

    let router = if config.is_production() {
        router.fallback_service(ServeDir::new(&config.static_dir))
    } else {
        router
            .fallback(handlers::not_found)
            .layer(cors_layer(&config.cors_allowed_origin)?)
    };

    Ok(router.layer(middleware::from_fn(log_request)))
}

fn api_routes(state: AppState) -> Router {
    // `/api` 配下の未定義パスは常に JSON の 404
    let todos = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:id",
            patch(handlers::complete_todo).delete(handlers::delete_todo),
        )
        .fallback(handlers::not_found)
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", todos)
}

fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_credentials(true))
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::info!(method = %method, path = %path, "Incoming request");
    let response = next.run(req).await;
    tracing::debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Request finished"
    );

    response
}
