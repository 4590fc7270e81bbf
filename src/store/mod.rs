mod scratch;

pub(crate) use scratch::{delete, ScratchFile};

use serde::Serialize;

/// Size of one addressable block of the scratch file.
pub(crate) const BLOCK_SIZE: usize = 1024 * 1024;

/// Number of blocks in the scratch file.
pub(crate) const BLOCK_COUNT: usize = 144;

/// Total scratch file size in bytes (144 MiB).
pub(crate) const SCRATCH_FILE_BYTES: u64 = (BLOCK_SIZE * BLOCK_COUNT) as u64;

/// Fixed name of the scratch file at the root of the active volume.
pub(crate) const SCRATCH_FILE_NAME: &str = "NoSleep.empty";

/// The kind of I/O a tick performs on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum OpKind {
    Read,
    Write,
}

impl OpKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}
