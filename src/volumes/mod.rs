mod default;
pub(crate) mod discovery;
mod disk_space;

pub(crate) use default::default_volume;
pub(crate) use discovery::{enumerate_fixed, enumerate_mounts};
pub(crate) use disk_space::get_disk_space;

use crate::config::AppConfig;
use crate::errors::KeepAwakeError;
use crate::store::SCRATCH_FILE_NAME;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// A selectable storage target, identified by its mount root.
///
/// Equality is exact-string: `/mnt/disk1` and `/mnt/disk1/` are different volumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Volume(String);

impl Volume {
    pub(crate) fn new(root: impl Into<String>) -> Self {
        Self(root.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn root(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Location of the scratch file on this volume.
    pub(crate) fn scratch_path(&self) -> PathBuf {
        self.root().join(SCRATCH_FILE_NAME)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the selector enumerates volumes from.
#[derive(Debug, Clone)]
pub(crate) enum VolumeSource {
    /// Parse a mount table such as `/proc/mounts`.
    MountTable(PathBuf),
    /// A configured list of roots.
    Fixed(Vec<String>),
}

/// Lists volumes and tracks which one the scratch file should live on.
#[derive(Debug)]
pub(crate) struct DeviceSelector {
    source: VolumeSource,
    preferred: Option<Volume>,
    pattern: Option<Regex>,
    active: Mutex<Option<Volume>>,
}

impl DeviceSelector {
    pub(crate) fn new(source: VolumeSource, preferred: Option<Volume>, pattern: Option<Regex>) -> Self {
        Self { source, preferred, pattern, active: Mutex::new(None) }
    }

    pub(crate) fn from_config(config: &AppConfig) -> Result<Self> {
        let source = if config.volumes.is_empty() {
            VolumeSource::MountTable(PathBuf::from(&config.mount_table))
        } else {
            VolumeSource::Fixed(config.volumes.clone())
        };

        let pattern = match config.preferred_volume.as_deref() {
            Some(p) => Some(
                Regex::new(p).with_context(|| format!("Invalid PREFERRED_VOLUME pattern: {p}"))?,
            ),
            None => None,
        };

        Ok(Self::new(source, config.volume.clone().map(Volume::new), pattern))
    }

    /// Enumerate the volumes available right now. Inaccessible ones are skipped.
    pub(crate) fn list_volumes(&self) -> Vec<Volume> {
        match &self.source {
            VolumeSource::MountTable(path) => enumerate_mounts(path),
            VolumeSource::Fixed(roots) => enumerate_fixed(roots),
        }
    }

    pub(crate) fn default_volume(&self, volumes: &[Volume]) -> Option<Volume> {
        default_volume(volumes, self.preferred.as_ref(), self.pattern.as_ref()).cloned()
    }

    pub(crate) fn active(&self) -> Option<Volume> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Record `volume` as the active target. Returns the previously active volume.
    ///
    /// The caller is responsible for asking the controller to move the scratch file.
    pub(crate) fn set_active(&self, volume: Volume) -> Result<Option<Volume>, KeepAwakeError> {
        if !self.list_volumes().contains(&volume) {
            return Err(KeepAwakeError::UnknownVolume(volume));
        }

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        info!("Active volume set to {}", volume);
        Ok(active.replace(volume))
    }

    /// Forget `volume` as the active target, if it still is. Returns whether it was cleared.
    pub(crate) fn clear_active(&self, volume: &Volume) -> bool {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref() != Some(volume) {
            return false;
        }
        *active = None;
        info!("Active volume {} cleared", volume);
        true
    }
}
