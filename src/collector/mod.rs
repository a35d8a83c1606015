//! Source readers for Linux `/proc` and `/sys` counters.
//!
//! This module provides the filesystem seam, the pure text parsers, and the
//! typed readers the metric samplers are built from.

pub mod cpu;
pub mod mock;
pub mod parser;
pub mod process;
pub mod sources;
pub mod traits;

pub use cpu::CpuUsageTracker;
pub use mock::MockFs;
pub use sources::{SampleError, Sources};
pub use traits::{FileSystem, FsStats, RealFs};
