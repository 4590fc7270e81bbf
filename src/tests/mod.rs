mod config_tests;
mod event_tests;
mod volumes_tests;

use crate::events::Event;
use crate::volumes::Volume;
use tempfile::TempDir;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// A fresh directory standing in for a volume root.
pub(super) fn temp_volume() -> (TempDir, Volume) {
    let dir = tempfile::tempdir().unwrap();
    let volume = Volume::new(dir.path().to_string_lossy().into_owned());
    (dir, volume)
}

/// Everything published so far, without waiting.
pub(super) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
        }
    }
}
