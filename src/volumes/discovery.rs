use super::{get_disk_space, Volume};
use std::path::Path;
use tracing::{debug, warn};

/// Filesystems that never back a physical device worth keeping awake.
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "autofs",
    "binfmt_misc",
    "bpf",
    "cgroup",
    "cgroup2",
    "configfs",
    "debugfs",
    "devpts",
    "devtmpfs",
    "efivarfs",
    "fusectl",
    "hugetlbfs",
    "mqueue",
    "nsfs",
    "proc",
    "pstore",
    "ramfs",
    "rpc_pipefs",
    "securityfs",
    "selinuxfs",
    "sysfs",
    "tmpfs",
    "tracefs",
];

/// One line of a mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MountEntry {
    pub mount_point: String,
    pub fs_type: String,
    pub read_only: bool,
}

/// Parse `/proc/mounts`-formatted text, keeping candidate volumes in table order.
///
/// Pseudo filesystems are dropped and repeated mount points (bind mounts,
/// stacked mounts) are kept only once.
pub(crate) fn parse_mount_table(contents: &str) -> Vec<MountEntry> {
    let mut entries: Vec<MountEntry> = Vec::new();

    for line in contents.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let fs_type = parts[2];
        if PSEUDO_FILESYSTEMS.contains(&fs_type) {
            continue;
        }

        let mount_point = unescape_octal(parts[1]);
        if entries.iter().any(|e| e.mount_point == mount_point) {
            continue;
        }

        let read_only = parts[3].split(',').any(|opt| opt == "ro");
        entries.push(MountEntry { mount_point, fs_type: fs_type.to_string(), read_only });
    }

    entries
}

/// Mount tables escape space, tab, newline and backslash as `\ooo`.
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(v) = u8::try_from(value) {
                    out.push(v);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Enumerate writable, reachable volumes from a mount table file.
pub(crate) fn enumerate_mounts(table_path: &Path) -> Vec<Volume> {
    let contents = match std::fs::read_to_string(table_path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Cannot read mount table {}: {}", table_path.display(), e);
            return Vec::new();
        }
    };

    parse_mount_table(&contents)
        .into_iter()
        .filter(|entry| {
            if entry.read_only {
                debug!("Skipping read-only {} mount {}", entry.fs_type, entry.mount_point);
                return false;
            }
            is_reachable(Path::new(&entry.mount_point))
        })
        .map(|entry| Volume::new(entry.mount_point))
        .collect()
}

/// Enumerate a configured list of roots, skipping ones that are not directories.
pub(crate) fn enumerate_fixed(roots: &[String]) -> Vec<Volume> {
    roots
        .iter()
        .filter(|root| {
            if Path::new(root).is_dir() {
                true
            } else {
                warn!("Configured volume {} is not an accessible directory, skipping", root);
                false
            }
        })
        .map(|root| Volume::new(root.clone()))
        .collect()
}

fn is_reachable(root: &Path) -> bool {
    match get_disk_space(root) {
        Ok(space) if space.total > 0 => true,
        Ok(_) => {
            debug!("Skipping zero-sized mount {}", root.display());
            false
        }
        Err(e) => {
            debug!("Skipping inaccessible mount {}: {}", root.display(), e);
            false
        }
    }
}
