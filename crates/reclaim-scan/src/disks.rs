//! Mounted partitions and their space usage.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

/// Space usage of one mounted partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    /// Device or source name, e.g. `/dev/sda1`.
    pub device: String,
    /// Where the partition is mounted.
    pub mountpoint: PathBuf,
    /// Filesystem type, e.g. `ext4`.
    pub filesystem: String,
    /// Total capacity in bytes.
    pub total: u64,
    /// Bytes in use.
    pub used: u64,
    /// Bytes available to unprivileged users.
    pub free: u64,
    /// Percentage in use, rounded to one decimal.
    pub percent: f64,
}

/// One line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: PathBuf,
    pub filesystem: String,
}

/// Raw block counts converted to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceInfo {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl SpaceInfo {
    /// Usage as a percentage of the space an unprivileged user can reach.
    pub fn percent(&self) -> f64 {
        let usable = self.used + self.available;
        if usable == 0 {
            return 0.0;
        }
        (self.used as f64 / usable as f64 * 1000.0).round() / 10.0
    }
}

/// Filesystem types the kernel lists without `nodev`, i.e. backed by a device.
pub fn parse_filesystems(text: &str) -> HashSet<String> {
    let mut physical: HashSet<String> = text
        .lines()
        .filter(|line| !line.starts_with("nodev"))
        .map(str::trim)
        .filter(|fs| !fs.is_empty())
        .map(str::to_string)
        .collect();
    // zfs is listed as nodev but lives on real disks
    physical.insert("zfs".to_string());
    physical
}

/// Parse a mount table in `/proc/self/mounts` format, keeping only
/// filesystems in `physical`.
pub fn parse_mounts(text: &str, physical: &HashSet<String>) -> Vec<MountEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let filesystem = fields.next()?;
            if !physical.contains(filesystem) {
                return None;
            }
            Some(MountEntry {
                device: unescape_octal(device),
                mountpoint: PathBuf::from(unescape_octal(mountpoint)),
                filesystem: filesystem.to_string(),
            })
        })
        .collect()
}

/// Undo the kernel's `\040`-style escaping of spaces and tabs.
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let digits = bytes.get(i + 1..i + 4).unwrap_or_default();
            if digits.len() == 3 && digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
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

/// Mounted physical partitions.
#[cfg(target_os = "linux")]
pub fn partitions() -> Vec<MountEntry> {
    let filesystems = match std::fs::read_to_string("/proc/filesystems") {
        Ok(text) => parse_filesystems(&text),
        Err(e) => {
            debug!("Cannot read /proc/filesystems: {e}");
            return Vec::new();
        }
    };
    match std::fs::read_to_string("/proc/self/mounts") {
        Ok(text) => parse_mounts(&text, &filesystems),
        Err(e) => {
            debug!("Cannot read mount table: {e}");
            Vec::new()
        }
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn partitions() -> Vec<MountEntry> {
    vec![MountEntry {
        device: "/".to_string(),
        mountpoint: PathBuf::from("/"),
        filesystem: String::new(),
    }]
}

#[cfg(not(unix))]
pub fn partitions() -> Vec<MountEntry> {
    Vec::new()
}

/// Query space usage of the filesystem containing `path`.
#[cfg(unix)]
pub fn space(path: &Path) -> Option<SpaceInfo> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    // SAFETY: statvfs is plain old data, so all-zero is a valid value.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: c_path is a valid NUL-terminated string and stat is a valid out pointer.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        debug!(path = %path.display(), "statvfs failed: {}", std::io::Error::last_os_error());
        return None;
    }

    let fragment = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * fragment;
    let free = stat.f_bfree as u64 * fragment;
    let available = stat.f_bavail as u64 * fragment;
    Some(SpaceInfo {
        total,
        used: total.saturating_sub(free),
        available,
    })
}

#[cfg(not(unix))]
pub fn space(_path: &Path) -> Option<SpaceInfo> {
    None
}

/// Usage of every mounted physical partition. Partitions whose usage cannot
/// be queried are left out.
pub fn disk_usage() -> Vec<DiskUsage> {
    partitions()
        .into_iter()
        .filter_map(|mount| {
            let info = space(&mount.mountpoint)?;
            Some(DiskUsage {
                device: mount.device,
                mountpoint: mount.mountpoint,
                filesystem: mount.filesystem,
                total: info.total,
                used: info.used,
                free: info.available,
                percent: info.percent(),
            })
        })
        .collect()
}
