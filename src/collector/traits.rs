//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the source readers to work with both the
//! real `/proc` and `/sys` filesystems on Linux and mock implementations for
//! testing on other platforms or in CI.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Filesystem capacity counters, as reported by `statvfs(3)`.
///
/// Only the fields the disk-space reader needs are carried.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FsStats {
    /// Total data blocks on the filesystem.
    pub blocks: u64,
    /// Blocks available to unprivileged users.
    pub blocks_available: u64,
}

/// Abstraction for filesystem operations.
///
/// This trait allows readers to use the real filesystem or a mock
/// implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Queries filesystem capacity statistics for a mount point.
    fn statfs(&self, path: &Path) -> io::Result<FsStats>;
}

/// Real filesystem implementation that delegates to `std::fs` and libc.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn statfs(&self, path: &Path) -> io::Result<FsStats> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;
        let mut stats: libc::statvfs = unsafe { std::mem::zeroed() };
        // SAFETY: c_path is a valid NUL-terminated string and stats is a
        // properly sized, writable statvfs buffer.
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stats) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(FsStats {
            blocks: stats.f_blocks as u64,
            blocks_available: stats.f_bavail as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_real_fs_read_to_string() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        let content = fs.read_to_string(&cargo_toml).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let fs = RealFs::new();
        let src_dir = env::current_dir().unwrap().join("src");
        let entries = fs.read_dir(&src_dir).unwrap();
        assert!(!entries.is_empty());
    }

    #[test]
    fn test_real_fs_statfs_current_dir() {
        let fs = RealFs::new();
        let stats = fs.statfs(&env::current_dir().unwrap()).unwrap();
        assert!(stats.blocks > 0);
        assert!(stats.blocks_available <= stats.blocks);
    }
}
