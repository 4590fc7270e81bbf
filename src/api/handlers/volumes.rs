use crate::api::responses::{ApiResponse, SelectVolumeRequest, VolumesResponse};
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

pub(crate) async fn get_volumes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let volumes = state.selector.list_volumes();
    let default = state.selector.default_volume(&volumes);
    Json(ApiResponse::ok(VolumesResponse { volumes, active: state.selector.active(), default }))
}

pub(crate) async fn select_volume(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectVolumeRequest>,
) -> impl IntoResponse {
    match state.begin_activation(req.volume).await {
        Ok(()) => Json(ApiResponse::ok("Volume selected, preparing scratch file")),
        Err(e) => Json(ApiResponse::<&str>::err(format!("{e}"))),
    }
}
