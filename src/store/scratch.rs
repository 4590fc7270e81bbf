use super::{OpKind, BLOCK_COUNT, BLOCK_SIZE, SCRATCH_FILE_BYTES};
use crate::errors::ScratchError;
use crate::volumes::{get_disk_space, Volume};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Open handle plus the one buffer every transfer reuses.
struct OpenScratch {
    file: File,
    buffer: Vec<u8>,
}

/// The scratch file on one volume, addressed in `BLOCK_SIZE` blocks.
///
/// All I/O is blocking; callers run it on the blocking pool. The handle sits
/// behind a mutex so a seek and its transfer are never interleaved with
/// another block operation, and `close` waits for any transfer in progress.
pub(crate) struct ScratchFile {
    volume: Volume,
    path: PathBuf,
    handle: Mutex<Option<OpenScratch>>,
}

impl std::fmt::Debug for ScratchFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchFile").field("path", &self.path).finish_non_exhaustive()
    }
}

impl ScratchFile {
    /// Create (or truncate) the scratch file on `volume` and write every block once.
    ///
    /// Runs for as long as writing 144 MiB takes. A failed pre-allocation
    /// leaves no partial file behind.
    pub(crate) fn create(volume: &Volume) -> Result<Self, ScratchError> {
        let path = volume.scratch_path();
        ensure_space(volume, &path)?;

        let start = Instant::now();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| ScratchError::io(&path, e))?;

        let buffer = vec![0u8; BLOCK_SIZE];
        if let Err(e) = preallocate(&mut file, &buffer) {
            drop(file);
            if let Err(rm_err) = fs::remove_file(&path) {
                debug!("Could not remove partial scratch file {}: {}", path.display(), rm_err);
            }
            return Err(ScratchError::io(&path, e));
        }

        info!(
            "Pre-allocated {} blocks ({} bytes) at {} in {:.1}s",
            BLOCK_COUNT,
            SCRATCH_FILE_BYTES,
            path.display(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            volume: volume.clone(),
            path,
            handle: Mutex::new(Some(OpenScratch { file, buffer })),
        })
    }

    /// Wrap an already open handle without pre-allocating.
    #[cfg(test)]
    pub(crate) fn from_file(volume: &Volume, file: File) -> Self {
        Self {
            volume: volume.clone(),
            path: volume.scratch_path(),
            handle: Mutex::new(Some(OpenScratch { file, buffer: vec![0u8; BLOCK_SIZE] })),
        }
    }

    pub(crate) const fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Read block `index` into the shared buffer. The content is discarded.
    pub(crate) fn read_block(&self, index: usize) -> Result<(), ScratchError> {
        self.transfer(index, OpKind::Read)
    }

    /// Overwrite block `index` with the shared buffer.
    pub(crate) fn write_block(&self, index: usize) -> Result<(), ScratchError> {
        self.transfer(index, OpKind::Write)
    }

    /// Seek to block `index` and move exactly one block in the direction of `kind`.
    fn transfer(&self, index: usize, kind: OpKind) -> Result<(), ScratchError> {
        if index >= BLOCK_COUNT {
            return Err(ScratchError::BlockOutOfRange(index));
        }

        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(open) = guard.as_mut() else {
            return Err(ScratchError::Closed);
        };

        let offset = (index * BLOCK_SIZE) as u64;
        open.file.seek(SeekFrom::Start(offset)).map_err(|e| ScratchError::io(&self.path, e))?;

        let result = match kind {
            OpKind::Read => open.file.read_exact(&mut open.buffer),
            OpKind::Write => open.file.write_all(&open.buffer),
        };
        result.map_err(|e| ScratchError::io(&self.path, e))
    }

    /// Release the handle. Closing twice is a no-op.
    pub(crate) fn close(&self) {
        let closed = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if closed.is_some() {
            debug!("Closed scratch file {}", self.path.display());
        }
    }
}

/// Remove the scratch file from `volume`. Never fails: cleanup is advisory.
///
/// Returns whether a file was actually removed.
pub(crate) fn delete(volume: &Volume) -> bool {
    let path = volume.scratch_path();
    match fs::remove_file(&path) {
        Ok(()) => {
            info!("Removed scratch file {}", path.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No scratch file to remove at {}", path.display());
            false
        }
        Err(e) => {
            warn!("Could not remove scratch file {}: {}", path.display(), e);
            false
        }
    }
}

fn preallocate(file: &mut File, buffer: &[u8]) -> io::Result<()> {
    for _ in 0..BLOCK_COUNT {
        file.write_all(buffer)?;
    }
    file.flush()
}

/// Fail early when the volume cannot hold the file. An existing scratch file
/// is about to be truncated, so its bytes count as free.
fn ensure_space(volume: &Volume, path: &Path) -> Result<(), ScratchError> {
    let space = get_disk_space(volume.root()).map_err(|e| ScratchError::io(volume.root(), e))?;
    let reclaimable = fs::metadata(path).map_or(0, |m| m.len());
    let available = space.available.saturating_add(reclaimable);

    if available < SCRATCH_FILE_BYTES {
        return Err(ScratchError::InsufficientSpace {
            volume: volume.clone(),
            needed: SCRATCH_FILE_BYTES,
            available,
        });
    }
    Ok(())
}
