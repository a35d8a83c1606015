//! The metric registry: catalog, gauge cells, and activation.
//!
//! Activation turns an ordered list of metric names into an [`ActiveSet`]:
//! one gauge cell per requested metric and one sampler per distinct source,
//! so composite groups share a single read per cycle.

pub mod catalog;
pub mod gauge;
pub mod samplers;

use std::collections::HashSet;

use tracing::info;

use crate::collector::sources::Sources;
use crate::collector::traits::FileSystem;
use crate::config::MonitorConfig;
use crate::registry::catalog::{MetricDef, SourceId};
use crate::registry::gauge::{BoardEntry, GaugeBoard, GaugeCell};
use crate::registry::samplers::{
    CpuUsageSampler, DiskActivityCells, DiskActivitySampler, FnSampler, MemoryCells,
    MemorySampler, NetworkCells, NetworkSampler, ProcessStateCells, ProcessStatesSampler,
    Sampler, SensorSampler,
};

/// Error type for a rejected activation request.
///
/// Activation is all-or-nothing: any bad name fails the whole request before
/// a single cell is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// Requested name has no catalog entry.
    UnknownMetric(String),
    /// Requested name appears more than once; metrics register once per run.
    DuplicateMetric(String),
}

impl std::fmt::Display for ActivationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationError::UnknownMetric(name) => {
                write!(f, "unknown metric '{}'", name)
            }
            ActivationError::DuplicateMetric(name) => {
                write!(f, "metric '{}' requested twice", name)
            }
        }
    }
}

impl std::error::Error for ActivationError {}

/// The result of a successful activation.
///
/// The samplers belong to the sampling loop; the board is the shared view
/// the exposition endpoint scrapes. Built once per run, never reshaped.
pub struct ActiveSet {
    samplers: Vec<Box<dyn Sampler>>,
    board: GaugeBoard,
}

impl ActiveSet {
    /// Number of active samplers (one per distinct source).
    pub fn sampler_count(&self) -> usize {
        self.samplers.len()
    }

    /// True when the activation list was empty.
    pub fn is_empty(&self) -> bool {
        self.board.is_empty()
    }

    /// A shareable handle on the gauge board.
    pub fn board(&self) -> GaugeBoard {
        self.board.clone()
    }

    /// The samplers, in first-appearance order of their sources.
    pub fn samplers_mut(&mut self) -> &mut [Box<dyn Sampler>] {
        &mut self.samplers
    }
}

/// Activates the requested metrics.
///
/// Every name must resolve in the catalog and appear at most once; cells are
/// allocated only for requested metrics, samplers only for sources with at
/// least one active cell.
pub fn activate<F>(
    fs: F,
    config: MonitorConfig,
    names: &[String],
) -> Result<ActiveSet, ActivationError>
where
    F: FileSystem + Clone + Send + 'static,
{
    let mut defs: Vec<&'static MetricDef> = Vec::with_capacity(names.len());
    let mut seen_names: HashSet<&str> = HashSet::new();

    for name in names {
        let def = catalog::find(name)
            .ok_or_else(|| ActivationError::UnknownMetric(name.clone()))?;
        if !seen_names.insert(def.name) {
            return Err(ActivationError::DuplicateMetric(name.clone()));
        }
        defs.push(def);
    }

    let entries: Vec<BoardEntry> = defs
        .iter()
        .map(|def| BoardEntry {
            def,
            cell: GaugeCell::new(),
        })
        .collect();

    let cell_for = |name: &str| -> Option<GaugeCell> {
        entries
            .iter()
            .find(|e| e.def.name == name)
            .map(|e| e.cell.clone())
    };

    let src = Sources::new(fs, config);
    let mut samplers: Vec<Box<dyn Sampler>> = Vec::new();
    let mut seen_sources: HashSet<SourceId> = HashSet::new();

    for (def, entry) in defs.iter().zip(&entries) {
        if !seen_sources.insert(def.source) {
            continue;
        }
        let cell = entry.cell.clone();
        let config = src.config().clone();

        let sampler: Box<dyn Sampler> = match def.source {
            SourceId::Network => Box::new(NetworkSampler::new(
                src.clone(),
                NetworkCells {
                    rx_bytes: cell_for("rx_bytes_total"),
                    tx_bytes: cell_for("tx_bytes_total"),
                    rx_errors: cell_for("rx_errors_total"),
                    tx_errors: cell_for("tx_errors_total"),
                    dropped_packets: cell_for("dropped_packets_total"),
                },
            )),
            SourceId::DiskActivity => Box::new(DiskActivitySampler::new(
                src.clone(),
                DiskActivityCells {
                    io_time_ms: cell_for("io_time_ms"),
                    writes_completed: cell_for("writes_completed_total"),
                    reads_completed: cell_for("reads_completed_total"),
                },
            )),
            SourceId::Memory => Box::new(MemorySampler::new(
                src.clone(),
                MemoryCells {
                    total_mb: cell_for("total_memory_mb"),
                    used_mb: cell_for("used_memory_mb"),
                    available_mb: cell_for("available_memory_mb"),
                },
            )),
            SourceId::ProcessStates => Box::new(ProcessStatesSampler::new(
                src.clone(),
                ProcessStateCells {
                    total: cell_for("total_processes"),
                    suspended: cell_for("suspended_processes"),
                    ready: cell_for("ready_processes"),
                    blocked: cell_for("blocked_processes"),
                },
            )),
            SourceId::CpuUsage => Box::new(CpuUsageSampler::new(src.clone(), cell)),
            SourceId::ContextSwitches => Box::new(FnSampler::new(
                "context_switches",
                src.clone(),
                |s| s.context_switches().map(|v| v as f64),
                cell,
            )),
            SourceId::MemoryUsage => Box::new(FnSampler::new(
                "memory_usage",
                src.clone(),
                |s| s.memory_usage_percent(),
                cell,
            )),
            SourceId::DiskSpace => Box::new(FnSampler::new(
                "disk_space",
                src.clone(),
                |s| s.disk_usage_percent(),
                cell,
            )),
            SourceId::RunningProcesses => Box::new(FnSampler::new(
                "procs_running",
                src.clone(),
                |s| s.procs_running().map(|v| v as f64),
                cell,
            )),
            SourceId::CpuTemperature => Box::new(SensorSampler::new(
                "cpu_temperature",
                src.clone(),
                config.cpu_temp_path,
                1000.0,
                cell,
            )),
            SourceId::BatteryVoltage => Box::new(SensorSampler::new(
                "battery_voltage",
                src.clone(),
                config.battery_voltage_path,
                1000.0,
                cell,
            )),
            SourceId::BatteryCurrent => Box::new(SensorSampler::new(
                "battery_current",
                src.clone(),
                config.battery_current_path,
                1000.0,
                cell,
            )),
            SourceId::CpuFrequency => Box::new(SensorSampler::new(
                "cpu_frequency",
                src.clone(),
                config.cpu_freq_path,
                1000.0,
                cell,
            )),
            SourceId::CpuFan => Box::new(SensorSampler::new(
                "cpu_fan",
                src.clone(),
                config.cpu_fan_path,
                1.0,
                cell,
            )),
            SourceId::GpuFan => Box::new(SensorSampler::new(
                "gpu_fan",
                src.clone(),
                config.gpu_fan_path,
                1.0,
                cell,
            )),
        };
        samplers.push(sampler);
    }

    info!(
        "Activated {} metrics across {} samplers",
        entries.len(),
        samplers.len()
    );

    Ok(ActiveSet {
        samplers,
        board: GaugeBoard::new(entries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_name_fails_whole_activation() {
        let result = activate(
            MockFs::new(),
            MonitorConfig::default(),
            &names(&["cpu_usage_percentage", "bogus_metric", "io_time_ms"]),
        );
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("unknown metric 'bogus_metric'".to_string())
        );
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let result = activate(
            MockFs::new(),
            MonitorConfig::default(),
            &names(&["io_time_ms", "io_time_ms"]),
        );
        assert!(matches!(result, Err(ActivationError::DuplicateMetric(_))));
    }

    #[test]
    fn test_empty_list_yields_empty_set() {
        let set = activate(MockFs::new(), MonitorConfig::default(), &[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.sampler_count(), 0);
    }

    #[test]
    fn test_composite_group_shares_one_sampler() {
        let set = activate(
            MockFs::new(),
            MonitorConfig::default(),
            &names(&[
                "rx_bytes_total",
                "tx_bytes_total",
                "rx_errors_total",
                "tx_errors_total",
                "dropped_packets_total",
            ]),
        )
        .unwrap();
        assert_eq!(set.board().len(), 5);
        assert_eq!(set.sampler_count(), 1);
    }

    #[test]
    fn test_mixed_activation_counts() {
        let set = activate(
            MockFs::new(),
            MonitorConfig::default(),
            &names(&[
                "cpu_usage_percentage",
                "total_memory_mb",
                "used_memory_mb",
                "context_switches",
            ]),
        )
        .unwrap();
        // memory metrics share a sampler, the others get their own
        assert_eq!(set.board().len(), 4);
        assert_eq!(set.sampler_count(), 3);
    }

    #[test]
    fn test_activation_then_sampling_publishes_to_board() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/stat",
            "cpu  100 0 50 800 10 5 5 0 0 0\nctxt 31337\n",
        );
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 4096 kB\nMemFree: 1024 kB\nMemAvailable: 2048 kB\nBuffers: 0 kB\nCached: 0 kB\n",
        );

        let mut set = activate(
            fs,
            MonitorConfig::default(),
            &names(&["context_switches", "memory_usage_percentage"]),
        )
        .unwrap();

        for sampler in set.samplers_mut() {
            sampler.sample().unwrap();
        }

        assert_eq!(
            set.board().snapshot(),
            vec![("context_switches", 31337.0), ("memory_usage_percentage", 50.0)]
        );
    }
}
