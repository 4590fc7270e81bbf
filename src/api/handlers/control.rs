use crate::api::responses::ApiResponse;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

pub(crate) async fn start(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.controller.start().await {
        Ok(()) => Json(ApiResponse::ok("Started")),
        Err(e) => Json(ApiResponse::<&str>::err(format!("{e}"))),
    }
}

pub(crate) async fn pause(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.controller.pause().await {
        Ok(()) => Json(ApiResponse::ok("Paused")),
        Err(e) => Json(ApiResponse::<&str>::err(format!("{e}"))),
    }
}

pub(crate) async fn resume(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.controller.resume().await {
        Ok(()) => Json(ApiResponse::ok("Resumed")),
        Err(e) => Json(ApiResponse::<&str>::err(format!("{e}"))),
    }
}
