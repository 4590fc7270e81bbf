use crate::errors::Stage;
use crate::state::KeepAwakeState;
use crate::store::OpKind;
use crate::volumes::Volume;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Events that flow from the keep-awake core to observers (the SSE endpoint, tests).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub(crate) enum Event {
    /// One tick touched a block. Emitted for the attempt, whatever the I/O outcome.
    Activity { block: usize, kind: OpKind, volume: Volume, at: DateTime<Utc> },

    /// An I/O operation failed. Tick failures do not stop the scheduler.
    Error { stage: Stage, message: String },

    /// A scratch file finished pre-allocation and is ready for ticks.
    ScratchReady { volume: Volume, bytes: u64, duration_seconds: f64 },

    /// The controller moved to a new lifecycle state.
    StateChanged { state: KeepAwakeState, volume: Option<Volume> },
}

impl Event {
    /// Returns the SSE event type name for this event variant.
    pub(crate) const fn event_type(&self) -> &'static str {
        match self {
            Self::Activity { .. } => "activity",
            Self::Error { .. } => "error",
            Self::ScratchReady { .. } => "scratch_ready",
            Self::StateChanged { .. } => "state_changed",
        }
    }
}

/// The central event broadcast hub.
///
/// The scheduler and controller send events here via `publish()`.
/// Observers subscribe via `subscribe()`; nothing in the core waits on them.
#[derive(Debug, Clone)]
pub(crate) struct EventHub {
    sender: broadcast::Sender<Event>,
}

impl EventHub {
    /// Create a new EventHub with the given channel capacity.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive a
    /// `Lagged` error and miss intermediate events. At two ticks per second,
    /// 256 covers two minutes of a stalled observer.
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Having no subscribers is normal, so the send result is not an error.
    pub(crate) fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Report a failure to observers.
    pub(crate) fn publish_error(&self, stage: Stage, message: impl Into<String>) {
        self.publish(Event::Error { stage, message: message.into() });
    }

    /// Subscribe to the event stream. Returns a broadcast Receiver.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}
