use crate::volumes::Volume;
use serde::Serialize;
use std::path::PathBuf;

/// Failures of the scratch file itself: creation, block I/O, background dispatch.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ScratchError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("insufficient space on {volume}: need {needed} bytes, {available} available")]
    InsufficientSpace { volume: Volume, needed: u64, available: u64 },

    #[error("scratch file is closed")]
    Closed,

    #[error("block index {0} is out of range")]
    BlockOutOfRange(usize),

    #[error("background I/O task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

impl ScratchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Errors surfaced by controller transitions.
///
/// Only `Init` and `Switch` abort a requested transition. Tick failures are
/// reported as events and cleanup failures are swallowed, so neither appears here.
/// `Busy` rejects a control request that arrives during pre-allocation.
#[derive(Debug, thiserror::Error)]
pub(crate) enum KeepAwakeError {
    #[error("cannot prepare scratch file on {volume}: {source}")]
    Init {
        volume: Volume,
        #[source]
        source: ScratchError,
    },

    #[error("cannot switch to {volume}: {source}")]
    Switch {
        volume: Volume,
        #[source]
        source: ScratchError,
    },

    #[error("no scratch file is prepared; select a volume first")]
    NotInitialized,

    #[error("volume {0} is not available")]
    UnknownVolume(Volume),

    #[error("a scratch file is still being prepared, try again when it is ready")]
    Busy,
}

/// Where a reported failure happened, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Stage {
    Init,
    Tick,
    Switch,
}
