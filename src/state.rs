use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::controller::KeepAwakeController;
use crate::errors::KeepAwakeError;
use crate::events::EventHub;
use crate::volumes::{DeviceSelector, Volume};
use tracing::{error, info};

/// Shared application state passed to all API handlers via axum's State extractor.
pub(crate) struct AppState {
    pub config: AppConfig,
    pub event_hub: EventHub,
    pub selector: DeviceSelector,
    pub controller: KeepAwakeController,
    /// Handle to the running volume preparation (initialize or switch), if any.
    pub background_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    /// Cancelled once the daemon starts shutting down; ends open event streams.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub(crate) fn new(config: AppConfig, event_hub: EventHub, selector: DeviceSelector) -> Self {
        let controller = KeepAwakeController::new(event_hub.clone());
        Self {
            config,
            event_hub,
            selector,
            controller,
            background_task: tokio::sync::Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Select `volume` and move the scratch file there in the background.
    ///
    /// The `background_task` slot stays locked from the busy check until the new
    /// handle is stored, so two selections can never both be in flight.
    pub(crate) async fn begin_activation(
        self: &Arc<Self>,
        volume: Volume,
    ) -> Result<(), KeepAwakeError> {
        let mut background = self.background_task.lock().await;
        if background.as_ref().is_some_and(|h| !h.is_finished())
            || self.controller.status().await.state == KeepAwakeState::Preparing
        {
            return Err(KeepAwakeError::Busy);
        }

        self.selector.set_active(volume.clone())?;
        info!("Volume {} selected", volume);

        let state = Arc::clone(self);
        *background = Some(tokio::spawn(async move {
            state.activate_volume(volume).await;
        }));
        Ok(())
    }

    /// Put the scratch file on `volume`: switch if one already exists,
    /// otherwise initialize (and start, when autostart is on).
    ///
    /// Failures are already logged and published by the controller. A volume
    /// that could not be prepared stops being the active one.
    pub(crate) async fn activate_volume(&self, volume: Volume) {
        let result = if self.controller.is_initialized().await {
            self.controller.switch_volume(volume.clone()).await
        } else {
            match self.controller.initialize(volume.clone()).await {
                Ok(()) if self.config.autostart => self.controller.start().await,
                other => other,
            }
        };

        if let Err(e) = result {
            error!("Volume activation failed: {}", e);
            if !self.controller.is_initialized().await {
                self.selector.clear_active(&volume);
            }
        }
    }
}

/// The keep-awake lifecycle state, serialized to the API as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeepAwakeState {
    /// No scratch file exists.
    Uninitialized,
    /// A scratch file is being pre-allocated.
    Preparing,
    /// Scratch file ready, scheduler stopped.
    Stopped,
    Running,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct KeepAwakeStatus {
    pub state: KeepAwakeState,
    pub volume: Option<Volume>,
    pub detail: Option<String>,
}

impl KeepAwakeStatus {
    pub(crate) const fn uninitialized() -> Self {
        Self { state: KeepAwakeState::Uninitialized, volume: None, detail: None }
    }

    pub(crate) fn failed(detail: impl Into<String>) -> Self {
        Self { state: KeepAwakeState::Uninitialized, volume: None, detail: Some(detail.into()) }
    }

    pub(crate) fn preparing(volume: &Volume) -> Self {
        Self {
            state: KeepAwakeState::Preparing,
            volume: Some(volume.clone()),
            detail: Some(format!("Pre-allocating scratch file on {volume}")),
        }
    }

    pub(crate) fn stopped(volume: &Volume) -> Self {
        Self { state: KeepAwakeState::Stopped, volume: Some(volume.clone()), detail: None }
    }

    pub(crate) fn running(volume: &Volume) -> Self {
        Self { state: KeepAwakeState::Running, volume: Some(volume.clone()), detail: None }
    }
}
