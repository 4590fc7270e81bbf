use crate::api::responses::{ApiResponse, StatusResponse};
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

pub(crate) async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.controller.status().await;
    Json(ApiResponse::ok(StatusResponse {
        state: status.state,
        volume: status.volume,
        detail: status.detail,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
