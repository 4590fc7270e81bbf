use crate::errors::{KeepAwakeError, ScratchError, Stage};
use crate::events::{Event, EventHub};
use crate::scheduler::{ActivityScheduler, SchedulerState};
use crate::state::KeepAwakeStatus;
use crate::store::{self, ScratchFile, SCRATCH_FILE_BYTES};
use crate::volumes::Volume;
use crate::KeepAwakeState;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

/// The scratch file currently in use and the scheduler bound to it.
struct ActiveScratch {
    volume: Volume,
    scheduler: ActivityScheduler,
}

/// Lifecycle owner for the keep-awake core.
///
/// Every transition holds the `active` lock for its full duration, so a
/// switch or shutdown is atomic to other callers: no tick can reach a scratch
/// file that is being torn down or is still pre-allocating.
///
/// Pre-allocation keeps that lock for seconds. `start`, `pause` and
/// `is_initialized` consult the `status` snapshot first and answer without
/// waiting while a file is being prepared.
pub(crate) struct KeepAwakeController {
    event_hub: EventHub,
    status: RwLock<KeepAwakeStatus>,
    active: Mutex<Option<ActiveScratch>>,
}

impl KeepAwakeController {
    pub(crate) fn new(event_hub: EventHub) -> Self {
        Self {
            event_hub,
            status: RwLock::new(KeepAwakeStatus::uninitialized()),
            active: Mutex::new(None),
        }
    }

    pub(crate) async fn status(&self) -> KeepAwakeStatus {
        self.status.read().await.clone()
    }

    /// Whether a prepared scratch file exists. Answers from the status snapshot.
    pub(crate) async fn is_initialized(&self) -> bool {
        matches!(self.status.read().await.state, KeepAwakeState::Stopped | KeepAwakeState::Running)
    }

    /// Prepare a scratch file on `volume`, replacing any existing one.
    /// The scheduler is left stopped.
    pub(crate) async fn initialize(&self, volume: Volume) -> Result<(), KeepAwakeError> {
        let mut active = self.active.lock().await;
        if let Some(current) = active.take() {
            self.teardown(current).await;
        }

        match self.prepare(&volume).await {
            Ok(scratch) => {
                *active = Some(scratch);
                self.set_status(KeepAwakeStatus::stopped(&volume)).await;
                Ok(())
            }
            Err(source) => {
                error!("Initialization on {} failed: {}", volume, source);
                self.event_hub.publish_error(Stage::Init, source.to_string());
                self.set_status(KeepAwakeStatus::failed(source.to_string())).await;
                Err(KeepAwakeError::Init { volume, source })
            }
        }
    }

    /// Start ticking. Fails until a scratch file has been prepared, and with
    /// `Busy` while one is being prepared.
    pub(crate) async fn start(&self) -> Result<(), KeepAwakeError> {
        self.reject_while_preparing().await?;
        let mut active = self.active.lock().await;
        let Some(current) = active.as_mut() else {
            return Err(KeepAwakeError::NotInitialized);
        };

        if current.scheduler.state() == SchedulerState::Running {
            return Ok(());
        }
        current.scheduler.start();
        self.set_status(KeepAwakeStatus::running(&current.volume)).await;
        Ok(())
    }

    pub(crate) async fn resume(&self) -> Result<(), KeepAwakeError> {
        self.start().await
    }

    /// Stop ticking. Pausing an idle or uninitialized controller is a no-op.
    /// A switch in progress restarts ticks when it finishes, so pausing it is `Busy`.
    pub(crate) async fn pause(&self) -> Result<(), KeepAwakeError> {
        self.reject_while_preparing().await?;
        let mut active = self.active.lock().await;
        let Some(current) = active.as_mut() else {
            return Ok(());
        };

        if current.scheduler.state() == SchedulerState::Stopped {
            return Ok(());
        }
        current.scheduler.stop().await;
        self.set_status(KeepAwakeStatus::stopped(&current.volume)).await;
        Ok(())
    }

    /// Move the scratch file to `volume`, resuming ticks if they were running.
    ///
    /// On failure the old file is already gone and the controller is left
    /// uninitialized; `initialize` must be called again.
    pub(crate) async fn switch_volume(&self, volume: Volume) -> Result<(), KeepAwakeError> {
        let mut active = self.active.lock().await;
        let Some(current) = active.take() else {
            return Err(KeepAwakeError::NotInitialized);
        };

        if current.volume == volume {
            *active = Some(current);
            return Ok(());
        }

        let was_running = current.scheduler.state() == SchedulerState::Running;
        info!("Switching scratch file from {} to {}", current.volume, volume);
        self.teardown(current).await;

        match self.prepare(&volume).await {
            Ok(mut scratch) => {
                if was_running {
                    scratch.scheduler.start();
                    self.set_status(KeepAwakeStatus::running(&volume)).await;
                } else {
                    self.set_status(KeepAwakeStatus::stopped(&volume)).await;
                }
                *active = Some(scratch);
                Ok(())
            }
            Err(source) => {
                error!("Switch to {} failed: {}", volume, source);
                self.event_hub.publish_error(Stage::Switch, source.to_string());
                self.set_status(KeepAwakeStatus::failed(source.to_string())).await;
                Err(KeepAwakeError::Switch { volume, source })
            }
        }
    }

    /// Stop ticking and remove the scratch file. Safe to call at any time, any number of times.
    pub(crate) async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        let Some(current) = active.take() else {
            return;
        };

        let volume = current.volume.clone();
        self.teardown(current).await;
        self.set_status(KeepAwakeStatus::uninitialized()).await;
        info!("Keep-awake shut down, scratch file on {} released", volume);
    }

    /// Pre-allocate on the blocking pool and bind a fresh, stopped scheduler.
    async fn prepare(&self, volume: &Volume) -> Result<ActiveScratch, ScratchError> {
        self.set_status(KeepAwakeStatus::preparing(volume)).await;

        let start = Instant::now();
        let target = volume.clone();
        let file = tokio::task::spawn_blocking(move || ScratchFile::create(&target)).await??;

        self.event_hub.publish(Event::ScratchReady {
            volume: volume.clone(),
            bytes: SCRATCH_FILE_BYTES,
            duration_seconds: start.elapsed().as_secs_f64(),
        });

        Ok(ActiveScratch {
            volume: volume.clone(),
            scheduler: ActivityScheduler::new(Arc::new(file), self.event_hub.clone()),
        })
    }

    /// Quiesce the scheduler, then close and delete the file. Cleanup failures are only logged.
    async fn teardown(&self, mut current: ActiveScratch) {
        current.scheduler.stop().await;

        let file = Arc::clone(current.scheduler.store());
        let volume = current.volume;
        let cleanup = tokio::task::spawn_blocking(move || {
            file.close();
            store::delete(&volume);
        });

        if let Err(e) = cleanup.await {
            warn!("Scratch cleanup task failed: {}", e);
        }
    }

    async fn reject_while_preparing(&self) -> Result<(), KeepAwakeError> {
        if self.status.read().await.state == KeepAwakeState::Preparing {
            return Err(KeepAwakeError::Busy);
        }
        Ok(())
    }

    async fn set_status(&self, status: KeepAwakeStatus) {
        self.event_hub.publish(Event::StateChanged {
            state: status.state,
            volume: status.volume.clone(),
        });
        *self.status.write().await = status;
    }
}
