//! In-memory mock filesystem for testing readers without a real `/proc`.
//!
//! `MockFs` simulates a filesystem in memory, allowing tests to fabricate
//! arbitrary `/proc` and `/sys` states, including unreadable files and fixed
//! `statvfs` answers.

use crate::collector::traits::{FileSystem, FsStats};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Paths that exist but fail to open, like a /proc entry for a process
    /// owned by another user.
    unreadable: HashSet<PathBuf>,
    /// Fixed statvfs answers per mount point.
    fs_stats: HashMap<PathBuf, FsStats>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds a path that shows up in directory listings but fails to read.
    pub fn add_unreadable(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.unreadable.insert(path);
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.directories.insert(path.clone());
        self.add_parents(&path);
    }

    /// Sets the statvfs answer for a mount point.
    pub fn set_fs_stats(&mut self, path: impl AsRef<Path>, stats: FsStats) {
        self.fs_stats.insert(path.as_ref().to_path_buf(), stats);
    }

    /// Adds `/proc/<pid>/stat` content for a fake process.
    pub fn add_process_stat(&mut self, proc_path: &str, pid: u32, stat: &str) {
        let dir = PathBuf::from(format!("{}/{}", proc_path, pid));
        self.add_dir(&dir);
        self.add_file(dir.join("stat"), stat);
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock: permission denied: {}", path.display()),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock: file not found: {}", path.display()),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock: directory not found: {}", path.display()),
            ));
        }

        let mut entries: Vec<PathBuf> = self
            .files
            .keys()
            .chain(self.unreadable.iter())
            .chain(self.directories.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    fn statfs(&self, path: &Path) -> io::Result<FsStats> {
        self.fs_stats.get(path).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock: no fs stats for: {}", path.display()),
            )
        })
    }
}
