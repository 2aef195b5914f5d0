//! HTTP adapter.
//!
//! Axum router exposing `/get_data` and `/trend` over a [`DocumentPort`].
//! Every response body is JSON, including 404 and 405 fallbacks.

mod error;
mod handlers;
mod session;

pub use error::{ErrorBody, WebError, status_from_error};
pub use handlers::*;
pub use session::StoreSession;

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::clock::Clock;
use crate::ports::document_port::DocumentPort;

pub struct AppState {
    pub store: Arc<dyn DocumentPort + Send + Sync>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/get_data", get(handlers::get_data))
        .route("/trend", get(handlers::trend))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
