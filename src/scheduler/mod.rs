mod activity;

pub(crate) use activity::Activity;

use crate::errors::{ScratchError, Stage};
use crate::events::{Event, EventHub};
use crate::store::{OpKind, ScratchFile};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Time between two ticks.
pub(crate) const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// How long `stop` waits for an in-flight block transfer before giving up on it.
pub(crate) const STOP_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SchedulerState {
    Stopped,
    Running,
}

struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives one random block transfer against a scratch file every `TICK_INTERVAL`.
///
/// At most one transfer is in flight: a tick that finds the previous transfer
/// still running is skipped rather than queued.
pub(crate) struct ActivityScheduler {
    store: Arc<ScratchFile>,
    event_hub: EventHub,
    ticker: Option<Ticker>,
}

impl ActivityScheduler {
    pub(crate) const fn new(store: Arc<ScratchFile>, event_hub: EventHub) -> Self {
        Self { store, event_hub, ticker: None }
    }

    pub(crate) const fn state(&self) -> SchedulerState {
        if self.ticker.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    pub(crate) fn store(&self) -> &Arc<ScratchFile> {
        &self.store
    }

    /// Begin ticking. The first tick fires one interval from now. No-op if running.
    pub(crate) fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(
            Arc::clone(&self.store),
            self.event_hub.clone(),
            cancel.clone(),
        ));
        self.ticker = Some(Ticker { cancel, handle });
        info!("Activity scheduler started on {}", self.store.volume());
    }

    /// Stop ticking and wait until no transfer is in flight. No-op if stopped.
    pub(crate) async fn stop(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };

        ticker.cancel.cancel();
        if let Err(e) = ticker.handle.await {
            error!("Activity ticker task failed: {}", e);
        }
        info!("Activity scheduler stopped on {}", self.store.volume());
    }
}

impl Drop for ActivityScheduler {
    fn drop(&mut self) {
        if let Some(ticker) = &self.ticker {
            ticker.cancel.cancel();
        }
    }
}

async fn run_ticker(store: Arc<ScratchFile>, event_hub: EventHub, cancel: CancellationToken) {
    let in_flight = Arc::new(Semaphore::new(1));
    let mut rng = StdRng::from_entropy();
    let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let Ok(permit) = Arc::clone(&in_flight).try_acquire_owned() else {
            debug!("Previous block transfer still in flight, skipping tick");
            continue;
        };

        let activity = Activity::draw(&mut rng);
        event_hub.publish(Event::Activity {
            block: activity.block,
            kind: activity.kind,
            volume: store.volume().clone(),
            at: Utc::now(),
        });

        let file = Arc::clone(&store);
        let hub = event_hub.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let result = match activity.kind {
                OpKind::Read => file.read_block(activity.block),
                OpKind::Write => file.write_block(activity.block),
            };
            if let Err(e) = result {
                report_tick_failure(&hub, activity, &e);
            }
        });
    }

    if time::timeout(STOP_GRACE, in_flight.acquire()).await.is_err() {
        warn!("Block transfer still in flight after {:?}, abandoning it", STOP_GRACE);
    }
}

fn report_tick_failure(event_hub: &EventHub, activity: Activity, err: &ScratchError) {
    if matches!(err, ScratchError::Closed) {
        debug!("Tick for block {} landed after close", activity.block);
        return;
    }

    warn!("Tick {} of block {} failed: {}", activity.kind.as_str(), activity.block, err);
    event_hub.publish_error(
        Stage::Tick,
        format!("{} of block {} failed: {err}", activity.kind.as_str(), activity.block),
    );
}
