//! The static metric catalog.
//!
//! Every metric the daemon can publish is declared here, together with the
//! kernel source that feeds it. The catalog is fixed at compile time; a
//! monitoring run activates a subset of it by name.

/// Kernel data source feeding a metric.
///
/// Metrics sharing a source form a composite group: one read of the source
/// per cycle updates every active gauge in the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// `/proc/net/dev`, configured interface row.
    Network,
    /// `/proc/diskstats`, summed over all devices.
    DiskActivity,
    /// `/proc/meminfo` absolute values.
    Memory,
    /// `ctxt` of `/proc/stat`.
    ContextSwitches,
    /// Rate over successive `/proc/stat` cpu lines.
    CpuUsage,
    /// `/proc/meminfo` derived percentage.
    MemoryUsage,
    /// `statvfs` of the root mount.
    DiskSpace,
    /// `procs_running` of `/proc/stat`.
    RunningProcesses,
    /// CPU temperature hwmon sensor.
    CpuTemperature,
    /// Battery voltage hwmon sensor.
    BatteryVoltage,
    /// Battery current hwmon sensor.
    BatteryCurrent,
    /// cpufreq scaling_cur_freq.
    CpuFrequency,
    /// CPU fan tachometer.
    CpuFan,
    /// GPU fan tachometer.
    GpuFan,
    /// `/proc/<pid>/stat` state census.
    ProcessStates,
}

/// One catalog entry: metric identity plus the source that feeds it.
#[derive(Debug)]
pub struct MetricDef {
    /// Unique metric name, as published to the exposition endpoint.
    pub name: &'static str,
    /// Human-readable description.
    pub help: &'static str,
    /// Source whose sampler writes this gauge.
    pub source: SourceId,
}

/// Every metric the daemon knows how to sample.
pub const CATALOG: &[MetricDef] = &[
    MetricDef {
        name: "rx_bytes_total",
        help: "Total received bytes",
        source: SourceId::Network,
    },
    MetricDef {
        name: "tx_bytes_total",
        help: "Total transmitted bytes",
        source: SourceId::Network,
    },
    MetricDef {
        name: "rx_errors_total",
        help: "Total receive errors",
        source: SourceId::Network,
    },
    MetricDef {
        name: "tx_errors_total",
        help: "Total transmit errors",
        source: SourceId::Network,
    },
    MetricDef {
        name: "dropped_packets_total",
        help: "Total dropped packets",
        source: SourceId::Network,
    },
    MetricDef {
        name: "io_time_ms",
        help: "Time spent on I/O in milliseconds",
        source: SourceId::DiskActivity,
    },
    MetricDef {
        name: "writes_completed_total",
        help: "Total writes completed",
        source: SourceId::DiskActivity,
    },
    MetricDef {
        name: "reads_completed_total",
        help: "Total reads completed",
        source: SourceId::DiskActivity,
    },
    MetricDef {
        name: "total_memory_mb",
        help: "Total memory in MB",
        source: SourceId::Memory,
    },
    MetricDef {
        name: "used_memory_mb",
        help: "Used memory in MB",
        source: SourceId::Memory,
    },
    MetricDef {
        name: "available_memory_mb",
        help: "Available memory in MB",
        source: SourceId::Memory,
    },
    MetricDef {
        name: "context_switches",
        help: "Context switches",
        source: SourceId::ContextSwitches,
    },
    MetricDef {
        name: "cpu_usage_percentage",
        help: "CPU usage in percentage",
        source: SourceId::CpuUsage,
    },
    MetricDef {
        name: "memory_usage_percentage",
        help: "Memory usage in percentage",
        source: SourceId::MemoryUsage,
    },
    MetricDef {
        name: "disk_usage_percentage",
        help: "Disk usage in percentage",
        source: SourceId::DiskSpace,
    },
    MetricDef {
        name: "running_processes_total",
        help: "Total running processes",
        source: SourceId::RunningProcesses,
    },
    MetricDef {
        name: "cpu_temperature_celsius",
        help: "CPU temperature in Celsius",
        source: SourceId::CpuTemperature,
    },
    MetricDef {
        name: "battery_voltage_volts",
        help: "Battery voltage in volts",
        source: SourceId::BatteryVoltage,
    },
    MetricDef {
        name: "battery_current_amperes",
        help: "Battery current in amperes",
        source: SourceId::BatteryCurrent,
    },
    MetricDef {
        name: "cpu_frequency_megahertz",
        help: "CPU frequency in MHz",
        source: SourceId::CpuFrequency,
    },
    MetricDef {
        name: "cpu_fan_speed_rpm",
        help: "CPU fan speed in RPM",
        source: SourceId::CpuFan,
    },
    MetricDef {
        name: "gpu_fan_speed_rpm",
        help: "GPU fan speed in RPM",
        source: SourceId::GpuFan,
    },
    MetricDef {
        name: "total_processes",
        help: "Total number of processes",
        source: SourceId::ProcessStates,
    },
    MetricDef {
        name: "suspended_processes",
        help: "Suspended processes",
        source: SourceId::ProcessStates,
    },
    MetricDef {
        name: "ready_processes",
        help: "Ready processes",
        source: SourceId::ProcessStates,
    },
    MetricDef {
        name: "blocked_processes",
        help: "Blocked processes",
        source: SourceId::ProcessStates,
    },
];

/// Looks a metric up by name.
pub fn find(name: &str) -> Option<&'static MetricDef> {
    CATALOG.iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let names: HashSet<&str> = CATALOG.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_find() {
        assert_eq!(
            find("cpu_usage_percentage").map(|d| d.source),
            Some(SourceId::CpuUsage)
        );
        assert!(find("no_such_metric").is_none());
    }

    #[test]
    fn test_composite_groups_share_a_source() {
        let network: Vec<_> = CATALOG
            .iter()
            .filter(|d| d.source == SourceId::Network)
            .collect();
        assert_eq!(network.len(), 5);

        let states: Vec<_> = CATALOG
            .iter()
            .filter(|d| d.source == SourceId::ProcessStates)
            .collect();
        assert_eq!(states.len(), 4);
    }
}
