/// Default location of the optional daemon config file.
pub(super) const DEFAULT_CONFIG_PATH: &str = "/etc/disk-nosleep/disk-nosleep.cfg";

/// Default port the daemon listens on (localhost only).
pub(super) const DEFAULT_PORT: u16 = 7092;

/// Mount table read when no explicit volume list is configured.
pub(super) const DEFAULT_MOUNT_TABLE: &str = "/proc/mounts";

/// Volumes matching this pattern are preferred as the startup default.
/// Removable and secondary disks are usually mounted under these roots.
pub(super) const DEFAULT_PREFERRED_VOLUME: &str = r"^/(mnt|media|run/media)/";
