//! Typed source readers over a [`FileSystem`].
//!
//! `Sources` binds the pure parsers to the configured paths. Every reader
//! returns either a domain value or a [`SampleError`]; failures are values
//! the sampling loop logs and moves past, never panics.

use std::path::{Path, PathBuf};

use crate::collector::parser::{
    self, CpuTicks, DiskTotals, InterfaceStats, MemInfo, ParseError,
};
use crate::collector::traits::FileSystem;
use crate::config::MonitorConfig;

/// Error type for sampling failures.
///
/// All variants are per-metric and non-fatal to the sampling loop.
#[derive(Debug)]
pub enum SampleError {
    /// Source file missing or unreadable.
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Source file content did not match the expected format.
    Parse(String),
    /// Zero (or negative) elapsed ticks between two CPU snapshots.
    NoElapsedTicks,
    /// First CPU sample; the tracker has no previous snapshot yet.
    NotReady,
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Unavailable { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            SampleError::Parse(msg) => write!(f, "parse error: {}", msg),
            SampleError::NoElapsedTicks => write!(f, "no elapsed ticks between CPU samples"),
            SampleError::NotReady => write!(f, "no previous CPU sample yet"),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Unavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for SampleError {
    fn from(e: ParseError) -> Self {
        SampleError::Parse(e.message)
    }
}

/// Source readers bound to a filesystem and a configuration.
///
/// Cheap to clone; each sampler holds its own copy.
#[derive(Debug, Clone)]
pub struct Sources<F: FileSystem> {
    fs: F,
    config: MonitorConfig,
}

impl<F: FileSystem + Clone> Sources<F> {
    /// Creates readers over `fs` using the paths in `config`.
    pub fn new(fs: F, config: MonitorConfig) -> Self {
        Self { fs, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Borrow of the underlying filesystem, for readers that walk
    /// directories themselves.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    fn read(&self, path: &Path) -> Result<String, SampleError> {
        self.fs
            .read_to_string(path)
            .map_err(|source| SampleError::Unavailable {
                path: path.to_path_buf(),
                source,
            })
    }

    fn read_proc(&self, name: &str) -> Result<String, SampleError> {
        self.read(Path::new(&format!("{}/{}", self.config.proc_path, name)))
    }

    /// Current cumulative CPU tick counters from `/proc/stat`.
    pub fn cpu_ticks(&self) -> Result<CpuTicks, SampleError> {
        Ok(parser::parse_cpu_ticks(&self.read_proc("stat")?)?)
    }

    /// Total context switches since boot (`ctxt` of `/proc/stat`).
    pub fn context_switches(&self) -> Result<u64, SampleError> {
        Ok(parser::parse_stat_scalar(&self.read_proc("stat")?, "ctxt")?)
    }

    /// Currently runnable processes (`procs_running` of `/proc/stat`).
    pub fn procs_running(&self) -> Result<u64, SampleError> {
        Ok(parser::parse_stat_scalar(
            &self.read_proc("stat")?,
            "procs_running",
        )?)
    }

    /// Memory counters from `/proc/meminfo`.
    pub fn meminfo(&self) -> Result<MemInfo, SampleError> {
        Ok(parser::parse_meminfo(&self.read_proc("meminfo")?)?)
    }

    /// Memory usage percentage; fails when MemTotal is zero.
    pub fn memory_usage_percent(&self) -> Result<f64, SampleError> {
        self.meminfo()?
            .usage_percent()
            .ok_or_else(|| SampleError::Parse("MemTotal is zero".to_string()))
    }

    /// Traffic counters for the configured interface from `/proc/net/dev`.
    ///
    /// An interface missing from the table yields all zeros; only an
    /// unreadable file is an error.
    pub fn network(&self) -> Result<InterfaceStats, SampleError> {
        let content = self.read_proc("net/dev")?;
        Ok(parser::parse_net_dev_interface(
            &content,
            &self.config.interface,
        ))
    }

    /// Machine-wide I/O totals from `/proc/diskstats`.
    pub fn disk_activity(&self) -> Result<DiskTotals, SampleError> {
        Ok(parser::parse_diskstats_totals(
            &self.read_proc("diskstats")?,
        ))
    }

    /// Disk usage percentage of the configured root mount.
    pub fn disk_usage_percent(&self) -> Result<f64, SampleError> {
        let stats = self.fs.statfs(&self.config.root_path).map_err(|source| {
            SampleError::Unavailable {
                path: self.config.root_path.clone(),
                source,
            }
        })?;
        if stats.blocks == 0 {
            return Err(SampleError::Parse(
                "filesystem reports zero blocks".to_string(),
            ));
        }
        let used = stats.blocks.saturating_sub(stats.blocks_available) as f64;
        Ok(used / stats.blocks as f64 * 100.0)
    }

    /// Reads a single-integer sensor file and applies the unit divisor.
    ///
    /// Hwmon files report milli-units (millidegrees, millivolts); the
    /// divisor converts to engineering units. Fan tachometers already report
    /// RPM and use a divisor of 1.
    pub fn sensor(&self, path: &Path, divisor: f64) -> Result<f64, SampleError> {
        let raw = parser::parse_sensor_value(&self.read(path)?)?;
        Ok(raw as f64 / divisor)
    }
}
