mod handlers;
pub(crate) mod responses;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete API router.
pub(crate) fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        // Status
        .route("/api/status", get(handlers::get_status))
        // Volumes
        .route("/api/volumes", get(handlers::get_volumes))
        .route("/api/volume", post(handlers::select_volume))
        // Scheduler control
        .route("/api/start", post(handlers::start))
        .route("/api/pause", post(handlers::pause))
        .route("/api/resume", post(handlers::resume))
        // SSE events
        .route("/api/events", get(handlers::sse_events))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until the state's shutdown token is cancelled
/// and every open connection, event streams included, has finished.
pub(crate) async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone().cancelled_owned();
    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await
}
