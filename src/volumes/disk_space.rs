use std::path::Path;

/// Space figures for the filesystem holding a path, in bytes.
pub(crate) struct DiskSpace {
    pub total: u64,
    /// Bytes available to an unprivileged writer.
    pub available: u64,
}

/// Get disk space info via statvfs.
#[cfg(unix)]
#[allow(unsafe_code)]
pub(crate) fn get_disk_space(path: &Path) -> std::io::Result<DiskSpace> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };

    let ret = unsafe { libc::statvfs(c_path.as_ptr(), &raw mut stat) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }

    let block_size = stat.f_frsize as u64;
    Ok(DiskSpace {
        total: stat.f_blocks as u64 * block_size,
        available: stat.f_bavail as u64 * block_size,
    })
}

/// Fallback for non-unix platforms.
#[cfg(not(unix))]
pub(crate) fn get_disk_space(_path: &Path) -> std::io::Result<DiskSpace> {
    tracing::warn!("get_disk_space: using dummy values on non-unix platform");
    Ok(DiskSpace { total: u64::MAX, available: u64::MAX })
}
