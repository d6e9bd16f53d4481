//! todo-api バイナリのエントリポイント

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use infrastructure::{DynamoDbTodoStore, InMemoryTodoStore, TodoStore};
use shared::{init_tracing, Config, StoreBackend};
use todo_api::{app, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config).context("failed to initialise tracing")?;

    info!(environment = %config.environment, "Starting todo service");

    let store: Arc<dyn TodoStore> = match config.store_backend {
        StoreBackend::DynamoDb => {
            let store = DynamoDbTodoStore::new(&config).await;
            store
                .verify_connection()
                .await
                .with_context(|| format!("failed to reach table {}", store.table_name()))?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; todos are lost on restart");
            Arc::new(InMemoryTodoStore::new())
        }
    };

    let router = app(AppState::new(store), &config).context("invalid CORS_ALLOWED_ORIGIN")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
