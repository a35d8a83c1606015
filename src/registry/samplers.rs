//! Samplers: the glue between a source reader and its gauge cells.
//!
//! One sampler exists per distinct active source. Single-gauge sources use
//! [`FnSampler`]; composite sources read once and fan the result out to
//! every active cell of the group. Group writes are per-cell atomic but not
//! transactional across the group.

use std::path::PathBuf;

use crate::collector::cpu::CpuUsageTracker;
use crate::collector::process::scan_process_states;
use crate::collector::sources::{SampleError, Sources};
use crate::collector::traits::FileSystem;
use crate::registry::gauge::GaugeCell;

/// A sampling capability: reads its source once and publishes into the
/// attached cells.
pub trait Sampler: Send {
    /// Short source name for log lines.
    fn source_name(&self) -> &'static str;

    /// Performs one sample. On error no cell is written; the previous
    /// values stay published.
    fn sample(&mut self) -> Result<(), SampleError>;
}

fn set_if_active(cell: &Option<GaugeCell>, value: f64) {
    if let Some(cell) = cell {
        cell.set(value);
    }
}

/// Sampler for sources producing exactly one gauge from a plain read.
pub struct FnSampler<F: FileSystem> {
    name: &'static str,
    src: Sources<F>,
    read: fn(&Sources<F>) -> Result<f64, SampleError>,
    cell: GaugeCell,
}

impl<F: FileSystem + Clone> FnSampler<F> {
    pub fn new(
        name: &'static str,
        src: Sources<F>,
        read: fn(&Sources<F>) -> Result<f64, SampleError>,
        cell: GaugeCell,
    ) -> Self {
        Self {
            name,
            src,
            read,
            cell,
        }
    }
}

impl<F: FileSystem + Clone> Sampler for FnSampler<F> {
    fn source_name(&self) -> &'static str {
        self.name
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let value = (self.read)(&self.src)?;
        self.cell.set(value);
        Ok(())
    }
}

/// Sampler for a single-integer sensor file with a unit divisor.
pub struct SensorSampler<F: FileSystem> {
    name: &'static str,
    src: Sources<F>,
    path: PathBuf,
    divisor: f64,
    cell: GaugeCell,
}

impl<F: FileSystem + Clone> SensorSampler<F> {
    pub fn new(
        name: &'static str,
        src: Sources<F>,
        path: PathBuf,
        divisor: f64,
        cell: GaugeCell,
    ) -> Self {
        Self {
            name,
            src,
            path,
            divisor,
            cell,
        }
    }
}

impl<F: FileSystem + Clone> Sampler for SensorSampler<F> {
    fn source_name(&self) -> &'static str {
        self.name
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let value = self.src.sensor(&self.path, self.divisor)?;
        self.cell.set(value);
        Ok(())
    }
}

/// CPU usage: the one sampler carrying state between cycles.
pub struct CpuUsageSampler<F: FileSystem> {
    src: Sources<F>,
    tracker: CpuUsageTracker,
    cell: GaugeCell,
}

impl<F: FileSystem + Clone> CpuUsageSampler<F> {
    pub fn new(src: Sources<F>, cell: GaugeCell) -> Self {
        Self {
            src,
            tracker: CpuUsageTracker::new(),
            cell,
        }
    }
}

impl<F: FileSystem + Clone> Sampler for CpuUsageSampler<F> {
    fn source_name(&self) -> &'static str {
        "cpu_usage"
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let ticks = self.src.cpu_ticks()?;
        let usage = self.tracker.update(ticks)?;
        self.cell.set(usage);
        Ok(())
    }
}

/// Cells of the memory composite group. Absent cells were not activated.
#[derive(Default)]
pub struct MemoryCells {
    pub total_mb: Option<GaugeCell>,
    pub used_mb: Option<GaugeCell>,
    pub available_mb: Option<GaugeCell>,
}

/// One `/proc/meminfo` read feeding up to three gauges.
pub struct MemorySampler<F: FileSystem> {
    src: Sources<F>,
    cells: MemoryCells,
}

impl<F: FileSystem + Clone> MemorySampler<F> {
    pub fn new(src: Sources<F>, cells: MemoryCells) -> Self {
        Self { src, cells }
    }
}

impl<F: FileSystem + Clone> Sampler for MemorySampler<F> {
    fn source_name(&self) -> &'static str {
        "meminfo"
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let info = self.src.meminfo()?;
        set_if_active(&self.cells.total_mb, info.total_mb());
        set_if_active(&self.cells.used_mb, info.used_mb());
        set_if_active(&self.cells.available_mb, info.available_mb());
        Ok(())
    }
}

/// Cells of the network composite group.
#[derive(Default)]
pub struct NetworkCells {
    pub rx_bytes: Option<GaugeCell>,
    pub tx_bytes: Option<GaugeCell>,
    pub rx_errors: Option<GaugeCell>,
    pub tx_errors: Option<GaugeCell>,
    pub dropped_packets: Option<GaugeCell>,
}

/// One `/proc/net/dev` parse feeding up to five gauges.
pub struct NetworkSampler<F: FileSystem> {
    src: Sources<F>,
    cells: NetworkCells,
}

impl<F: FileSystem + Clone> NetworkSampler<F> {
    pub fn new(src: Sources<F>, cells: NetworkCells) -> Self {
        Self { src, cells }
    }
}

impl<F: FileSystem + Clone> Sampler for NetworkSampler<F> {
    fn source_name(&self) -> &'static str {
        "net_dev"
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let stats = self.src.network()?;
        set_if_active(&self.cells.rx_bytes, stats.rx_bytes as f64);
        set_if_active(&self.cells.tx_bytes, stats.tx_bytes as f64);
        set_if_active(&self.cells.rx_errors, stats.rx_errors as f64);
        set_if_active(&self.cells.tx_errors, stats.tx_errors as f64);
        set_if_active(&self.cells.dropped_packets, stats.rx_dropped as f64);
        Ok(())
    }
}

/// Cells of the disk-activity composite group.
#[derive(Default)]
pub struct DiskActivityCells {
    pub io_time_ms: Option<GaugeCell>,
    pub writes_completed: Option<GaugeCell>,
    pub reads_completed: Option<GaugeCell>,
}

/// One `/proc/diskstats` parse feeding up to three gauges.
pub struct DiskActivitySampler<F: FileSystem> {
    src: Sources<F>,
    cells: DiskActivityCells,
}

impl<F: FileSystem + Clone> DiskActivitySampler<F> {
    pub fn new(src: Sources<F>, cells: DiskActivityCells) -> Self {
        Self { src, cells }
    }
}

impl<F: FileSystem + Clone> Sampler for DiskActivitySampler<F> {
    fn source_name(&self) -> &'static str {
        "diskstats"
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let totals = self.src.disk_activity()?;
        set_if_active(&self.cells.io_time_ms, totals.io_time_ms as f64);
        set_if_active(&self.cells.writes_completed, totals.writes_completed as f64);
        set_if_active(&self.cells.reads_completed, totals.reads_completed as f64);
        Ok(())
    }
}

/// Cells of the process-state composite group.
#[derive(Default)]
pub struct ProcessStateCells {
    pub total: Option<GaugeCell>,
    pub suspended: Option<GaugeCell>,
    pub ready: Option<GaugeCell>,
    pub blocked: Option<GaugeCell>,
}

/// One `/proc` scan feeding up to four gauges.
pub struct ProcessStatesSampler<F: FileSystem> {
    src: Sources<F>,
    cells: ProcessStateCells,
}

impl<F: FileSystem + Clone> ProcessStatesSampler<F> {
    pub fn new(src: Sources<F>, cells: ProcessStateCells) -> Self {
        Self { src, cells }
    }
}

impl<F: FileSystem + Clone> Sampler for ProcessStatesSampler<F> {
    fn source_name(&self) -> &'static str {
        "process_states"
    }

    fn sample(&mut self) -> Result<(), SampleError> {
        let counts = scan_process_states(self.src.fs(), &self.src.config().proc_path)?;
        set_if_active(&self.cells.total, counts.total as f64);
        set_if_active(&self.cells.suspended, counts.suspended as f64);
        set_if_active(&self.cells.ready, counts.ready as f64);
        set_if_active(&self.cells.blocked, counts.blocked as f64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::config::MonitorConfig;

    fn sources(fs: MockFs) -> Sources<MockFs> {
        Sources::new(fs, MonitorConfig::default())
    }

    #[test]
    fn test_network_sampler_round_trips_exact_counts() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
wlp4s0: 11111     5678    7    9    0     0          0        10 22222     4321    3    4    0     0       0          0
",
        );

        let cells = NetworkCells {
            rx_bytes: Some(GaugeCell::new()),
            tx_bytes: Some(GaugeCell::new()),
            rx_errors: Some(GaugeCell::new()),
            tx_errors: Some(GaugeCell::new()),
            dropped_packets: Some(GaugeCell::new()),
        };
        let rx = cells.rx_bytes.clone().unwrap();
        let tx = cells.tx_bytes.clone().unwrap();
        let rx_err = cells.rx_errors.clone().unwrap();
        let tx_err = cells.tx_errors.clone().unwrap();
        let dropped = cells.dropped_packets.clone().unwrap();

        let mut sampler = NetworkSampler::new(sources(fs), cells);
        sampler.sample().unwrap();

        assert_eq!(rx.get(), 11111.0);
        assert_eq!(tx.get(), 22222.0);
        assert_eq!(rx_err.get(), 7.0);
        assert_eq!(tx_err.get(), 3.0);
        assert_eq!(dropped.get(), 9.0);
    }

    #[test]
    fn test_composite_sampler_skips_inactive_cells() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 2048 kB\nMemFree: 1024 kB\nMemAvailable: 1536 kB\nBuffers: 0 kB\nCached: 0 kB\n",
        );

        let cells = MemoryCells {
            total_mb: Some(GaugeCell::new()),
            used_mb: None,
            available_mb: None,
        };
        let total = cells.total_mb.clone().unwrap();

        let mut sampler = MemorySampler::new(sources(fs), cells);
        sampler.sample().unwrap();
        assert_eq!(total.get(), 2.0);
    }

    #[test]
    fn test_failed_sample_leaves_cells_untouched() {
        let cell = GaugeCell::new();
        cell.set(37.0);

        // no /proc/diskstats in the mock
        let cells = DiskActivityCells {
            io_time_ms: Some(cell.clone()),
            ..DiskActivityCells::default()
        };
        let mut sampler = DiskActivitySampler::new(sources(MockFs::new()), cells);

        assert!(sampler.sample().is_err());
        assert_eq!(cell.get(), 37.0);
    }

    #[test]
    fn test_cpu_usage_sampler_first_cycle_not_ready() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  100 0 50 800 10 5 5 0 0 0\n");
        let cell = GaugeCell::new();
        let mut sampler = CpuUsageSampler::new(sources(fs), cell.clone());

        assert!(matches!(sampler.sample(), Err(SampleError::NotReady)));
        assert_eq!(cell.get(), 0.0);
    }

    #[test]
    fn test_sensor_sampler_publishes_scaled_value() {
        let mut fs = MockFs::new();
        fs.add_file("/sys/class/hwmon/hwmon4/temp1_input", "51000\n");
        let cell = GaugeCell::new();
        let mut sampler = SensorSampler::new(
            "cpu_temperature",
            sources(fs),
            PathBuf::from("/sys/class/hwmon/hwmon4/temp1_input"),
            1000.0,
            cell.clone(),
        );

        sampler.sample().unwrap();
        assert_eq!(cell.get(), 51.0);
    }
}
