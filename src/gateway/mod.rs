//! HTTP gateway over the crawl service
//!
//! # Routes
//!
//! | Method | Path | Responses |
//! |--------|------|-----------|
//! | POST | `/tasks/` | `201 {"taskID": ...}`, `400 {"error": "bad request"}` |
//! | GET | `/tasks/{task_id}/?delete=1` | `200` CSV, `204` in progress, `404 {"error": "task not found"}` |
//!
//! Both paths are also served without the trailing slash.

mod handlers;

pub use handlers::{create_task, get_task, ApiError, AppState, TaskQuery};

use crate::service::MetaCrawl;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builds the gateway router
pub fn router(service: Arc<MetaCrawl>) -> Router {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/", post(create_task))
        .route("/tasks/{task_id}", get(get_task))
        .route("/tasks/{task_id}/", get(get_task))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serves the gateway on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, service: Arc<MetaCrawl>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on {}", addr);
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
