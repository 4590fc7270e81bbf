use crate::state::KeepAwakeState;
use crate::volumes::Volume;
use serde::{Deserialize, Serialize};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) const fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub(crate) fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

/// Request body for POST /api/volume.
#[derive(Debug, Deserialize)]
pub(crate) struct SelectVolumeRequest {
    pub volume: Volume,
}

/// Body of GET /api/status.
#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    pub state: KeepAwakeState,
    pub volume: Option<Volume>,
    pub detail: Option<String>,
    pub version: String,
}

/// Body of GET /api/volumes.
#[derive(Debug, Serialize)]
pub(crate) struct VolumesResponse {
    pub volumes: Vec<Volume>,
    pub active: Option<Volume>,
    pub default: Option<Volume>,
}
