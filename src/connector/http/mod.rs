//! JSON HTTP API over the same use cases as the CLI.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::api::Container;

pub use error::{ApiResult, AppError};
pub use handlers::{QueryRequest, UPLOAD_SOURCE};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn router(container: Arc<Container>) -> axum::Router {
    axum::Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/documents",
            get(handlers::list_documents).post(handlers::upload_document),
        )
        .route(
            "/documents/{id}",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .route("/documents/{id}/chunks", get(handlers::get_chunks))
        .route("/documents/{id}/query", post(handlers::query_document))
        .route("/query", post(handlers::query_all))
        .route("/queries", get(handlers::list_queries))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(container)
}

pub async fn serve(container: Arc<Container>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(container))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
