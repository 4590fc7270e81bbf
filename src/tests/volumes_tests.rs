use super::temp_volume;
use crate::errors::KeepAwakeError;
use crate::volumes::discovery::{parse_mount_table, MountEntry};
use crate::volumes::{
    default_volume, enumerate_fixed, enumerate_mounts, DeviceSelector, Volume, VolumeSource,
};
use regex::Regex;
use std::io::Write;

const SAMPLE_MOUNTS: &str = "\
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev,mode=755 0 0
/dev/sda2 / ext4 rw,relatime 0 0
/dev/sdb1 /mnt/backup\\040disk xfs rw,noatime 0 0
/dev/sr0 /media/cdrom iso9660 ro,nosuid 0 0
/dev/sda2 / ext4 rw,relatime 0 0
short line
";

fn volumes(roots: &[&str]) -> Vec<Volume> {
    roots.iter().map(|r| Volume::new(*r)).collect()
}

#[test]
fn test_parse_mount_table_filters_pseudo_and_duplicates() {
    let entries = parse_mount_table(SAMPLE_MOUNTS);
    assert_eq!(
        entries,
        vec![
            MountEntry { mount_point: "/".into(), fs_type: "ext4".into(), read_only: false },
            MountEntry {
                mount_point: "/mnt/backup disk".into(),
                fs_type: "xfs".into(),
                read_only: false
            },
            MountEntry {
                mount_point: "/media/cdrom".into(),
                fs_type: "iso9660".into(),
                read_only: true
            },
        ]
    );
}

#[test]
fn test_enumerate_mounts_skips_unusable_entries() {
    let (_dir, volume) = temp_volume();
    let (_ro_dir, ro_volume) = temp_volume();

    let mut table = tempfile::NamedTempFile::new().unwrap();
    writeln!(table, "proc /proc proc rw 0 0").unwrap();
    writeln!(table, "/dev/sdz1 {} ext4 rw,relatime 0 0", volume).unwrap();
    writeln!(table, "/dev/sdz2 {} ext4 ro,relatime 0 0", ro_volume).unwrap();
    writeln!(table, "/dev/sdz3 /nonexistent/disk-nosleep-mount ext4 rw 0 0").unwrap();
    table.flush().unwrap();

    assert_eq!(enumerate_mounts(table.path()), vec![volume]);
    assert!(enumerate_mounts(std::path::Path::new("/nonexistent/mounts")).is_empty());
}

#[test]
fn test_enumerate_fixed_skips_missing_roots() {
    let (_dir, volume) = temp_volume();
    let roots = vec![volume.to_string(), "/nonexistent/disk-nosleep-root".to_string()];
    assert_eq!(enumerate_fixed(&roots), vec![volume]);
}

#[test]
fn test_default_volume_heuristic() {
    let listed = volumes(&["/", "/mnt/disk1", "/home", "/mnt/disk2"]);
    let pattern = Regex::new(r"^/mnt/").unwrap();

    // Explicit choice wins when listed.
    let preferred = Volume::new("/home");
    assert_eq!(default_volume(&listed, Some(&preferred), Some(&pattern)), Some(&listed[2]));

    // Otherwise the last pattern match.
    let unlisted = Volume::new("/mnt/gone");
    assert_eq!(default_volume(&listed, Some(&unlisted), Some(&pattern)), Some(&listed[3]));

    // Otherwise the first listed.
    let no_match = Regex::new(r"^/srv/").unwrap();
    assert_eq!(default_volume(&listed, None, Some(&no_match)), Some(&listed[0]));
    assert_eq!(default_volume(&listed, None, None), Some(&listed[0]));

    assert_eq!(default_volume(&[], None, Some(&pattern)), None);
}

#[test]
fn test_selector_set_active_requires_listed_volume() {
    let (_a_dir, a) = temp_volume();
    let (_b_dir, b) = temp_volume();
    let selector = DeviceSelector::new(
        VolumeSource::Fixed(vec![a.to_string(), b.to_string()]),
        None,
        None,
    );

    assert_eq!(selector.list_volumes(), vec![a.clone(), b.clone()]);
    assert_eq!(selector.default_volume(&selector.list_volumes()), Some(a.clone()));
    assert!(selector.active().is_none());

    assert_eq!(selector.set_active(a.clone()).unwrap(), None);
    assert_eq!(selector.set_active(b.clone()).unwrap(), Some(a));
    assert_eq!(selector.active(), Some(b.clone()));

    let err = selector.set_active(Volume::new("/nonexistent/disk-nosleep-root")).unwrap_err();
    assert!(matches!(err, KeepAwakeError::UnknownVolume(_)));
    assert_eq!(selector.active(), Some(b), "a rejected selection must not change the active volume");
}

#[test]
fn test_selector_clear_active_only_forgets_matching_volume() {
    let (_a_dir, a) = temp_volume();
    let (_b_dir, b) = temp_volume();
    let selector = DeviceSelector::new(VolumeSource::Fixed(vec![a.to_string(), b.to_string()]), None, None);

    selector.set_active(b.clone()).unwrap();
    assert!(!selector.clear_active(&a), "a stale failure must not clear a newer selection");
    assert_eq!(selector.active(), Some(b.clone()));

    assert!(selector.clear_active(&b));
    assert_eq!(selector.active(), None);
    assert!(!selector.clear_active(&b));
}
