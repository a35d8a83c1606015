//! Parsers for `/proc` and `/sys` file contents.
//!
//! These are pure functions that parse the raw text of kernel-exposed files
//! into typed values. They are designed to be easily testable with string
//! inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Cumulative CPU tick counters from the aggregate `cpu` line of `/proc/stat`.
///
/// All counters increase monotonically from boot (USER_HZ units) and reset
/// only on reboot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTicks {
    /// Ticks spent idle, including I/O wait.
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }

    /// Ticks spent doing work of any kind.
    pub fn non_idle(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq + self.steal
    }

    /// All ticks accounted for.
    pub fn total(&self) -> u64 {
        self.idle_total() + self.non_idle()
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat` into eight tick counters.
///
/// Fails if the line is missing or carries fewer than eight numeric fields.
pub fn parse_cpu_ticks(content: &str) -> Result<CpuTicks, ParseError> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu ") || l.starts_with("cpu\t"))
        .ok_or_else(|| ParseError::new("missing aggregate cpu line"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map_while(|s| s.parse().ok())
        .collect();

    if fields.len() < 8 {
        return Err(ParseError::new(format!(
            "cpu line has {} fields, expected at least 8",
            fields.len()
        )));
    }

    Ok(CpuTicks {
        user: fields[0],
        nice: fields[1],
        system: fields[2],
        idle: fields[3],
        iowait: fields[4],
        irq: fields[5],
        softirq: fields[6],
        steal: fields[7],
    })
}

/// Parses a single scalar key of `/proc/stat` (e.g. `ctxt`, `procs_running`).
pub fn parse_stat_scalar(content: &str, key: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() == Some(key) {
            return parts
                .next()
                .ok_or_else(|| ParseError::new(format!("missing value for '{}'", key)))?
                .parse()
                .map_err(|_| ParseError::new(format!("invalid value for '{}'", key)));
        }
    }
    Err(ParseError::new(format!("key '{}' not found", key)))
}

/// Subset of `/proc/meminfo` used by the memory gauges (all values in kB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub free_kb: u64,
    pub available_kb: u64,
    pub buffers_kb: u64,
    pub cached_kb: u64,
}

impl MemInfo {
    /// Total memory in MB.
    pub fn total_mb(&self) -> f64 {
        self.total_kb as f64 / 1024.0
    }

    /// Memory in active use, in MB: Total - Free - Buffers - Cached.
    pub fn used_mb(&self) -> f64 {
        self.total_kb
            .saturating_sub(self.free_kb)
            .saturating_sub(self.buffers_kb)
            .saturating_sub(self.cached_kb) as f64
            / 1024.0
    }

    /// Available memory in MB.
    pub fn available_mb(&self) -> f64 {
        self.available_kb as f64 / 1024.0
    }

    /// Usage percentage: (Total - Available) / Total * 100.
    ///
    /// `None` when total is zero (degenerate input, cannot divide).
    pub fn usage_percent(&self) -> Option<f64> {
        if self.total_kb == 0 {
            return None;
        }
        let used = self.total_kb.saturating_sub(self.available_kb) as f64;
        Some(used / self.total_kb as f64 * 100.0)
    }
}

/// Parses the `/proc/meminfo` keys the memory gauges need.
///
/// Fails if `MemTotal` or `MemAvailable` is absent; the remaining keys
/// default to zero when missing.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut seen_total = false;
    let mut seen_available = false;

    let parse_kb = |line: &str| -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.total_kb = parse_kb(line);
            seen_total = true;
        } else if line.starts_with("MemFree:") {
            info.free_kb = parse_kb(line);
        } else if line.starts_with("MemAvailable:") {
            info.available_kb = parse_kb(line);
            seen_available = true;
        } else if line.starts_with("Buffers:") {
            info.buffers_kb = parse_kb(line);
        } else if line.starts_with("Cached:") {
            info.cached_kb = parse_kb(line);
        }
    }

    if !seen_total {
        return Err(ParseError::new("MemTotal missing from meminfo"));
    }
    if !seen_available {
        return Err(ParseError::new("MemAvailable missing from meminfo"));
    }

    Ok(info)
}

/// Traffic counters for one interface row of `/proc/net/dev`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_dropped: u64,
}

/// Parses `/proc/net/dev` content and extracts counters for one interface.
///
/// Header lines (the two containing `|`) are skipped; the interface is
/// matched exactly by the name before the colon. An interface that is not
/// present yields an all-zero result, which is distinct from an unreadable
/// file (that failure is raised by the caller that does the read).
///
/// Post-colon field positions: 0 rx_bytes, 2 rx_errs, 3 rx_drop,
/// 8 tx_bytes, 10 tx_errs.
pub fn parse_net_dev_interface(content: &str, interface: &str) -> InterfaceStats {
    for line in content.lines() {
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != interface {
            continue;
        }

        let values: Vec<&str> = rest.split_whitespace().collect();
        if values.len() < 11 {
            continue;
        }

        let get_val =
            |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        return InterfaceStats {
            rx_bytes: get_val(0),
            rx_errors: get_val(2),
            rx_dropped: get_val(3),
            tx_bytes: get_val(8),
            tx_errors: get_val(10),
        };
    }

    InterfaceStats::default()
}

/// Whole-machine I/O totals summed over every device in `/proc/diskstats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskTotals {
    /// Reads completed successfully, all devices.
    pub reads_completed: u64,
    /// Writes completed successfully, all devices.
    pub writes_completed: u64,
    /// Milliseconds spent doing I/O, all devices.
    pub io_time_ms: u64,
}

/// Parses `/proc/diskstats`, summing reads, writes and I/O-busy time
/// across all devices. Malformed lines are skipped.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged
/// w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats_totals(content: &str) -> DiskTotals {
    let mut totals = DiskTotals::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 13 {
            continue;
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        totals.reads_completed += get_val(3);
        totals.writes_completed += get_val(7);
        totals.io_time_ms += get_val(12);
    }

    totals
}

/// Parses a single-integer sensor file (hwmon, cpufreq).
pub fn parse_sensor_value(content: &str) -> Result<i64, ParseError> {
    content
        .trim()
        .parse()
        .map_err(|_| ParseError::new(format!("invalid sensor value '{}'", content.trim())))
}

/// Extracts the one-character process state code from `/proc/<pid>/stat`.
///
/// The state is the third whitespace-delimited field. A comm containing
/// spaces shifts the fields, so the returned character then comes from
/// inside the comm; such a process still parses and is counted as an
/// unclassified state by the census.
pub fn parse_process_state(content: &str) -> Result<char, ParseError> {
    content
        .split_whitespace()
        .nth(2)
        .and_then(|s| s.chars().next())
        .ok_or_else(|| ParseError::new("stat has no state field"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_FIXTURE: &str = "\
cpu  10000 500 3000 80000 1000 200 100 50 0 0
cpu0 2500 125 750 20000 250 50 25 12 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
";

    #[test]
    fn test_parse_cpu_ticks() {
        let ticks = parse_cpu_ticks(STAT_FIXTURE).unwrap();
        assert_eq!(ticks.user, 10000);
        assert_eq!(ticks.nice, 500);
        assert_eq!(ticks.system, 3000);
        assert_eq!(ticks.idle, 80000);
        assert_eq!(ticks.iowait, 1000);
        assert_eq!(ticks.irq, 200);
        assert_eq!(ticks.softirq, 100);
        assert_eq!(ticks.steal, 50);

        assert_eq!(ticks.idle_total(), 81000);
        assert_eq!(ticks.non_idle(), 13850);
        assert_eq!(ticks.total(), 94850);
    }

    #[test]
    fn test_parse_cpu_ticks_too_few_fields() {
        let err = parse_cpu_ticks("cpu  1 2 3 4 5 6 7\n").unwrap_err();
        assert!(err.message.contains("expected at least 8"));
    }

    #[test]
    fn test_parse_cpu_ticks_missing_line() {
        assert!(parse_cpu_ticks("ctxt 12345\n").is_err());
        // per-cpu lines must not satisfy the aggregate lookup
        assert!(parse_cpu_ticks("cpu0 1 2 3 4 5 6 7 8\n").is_err());
    }

    #[test]
    fn test_parse_stat_scalar() {
        assert_eq!(parse_stat_scalar(STAT_FIXTURE, "ctxt").unwrap(), 500000);
        assert_eq!(
            parse_stat_scalar(STAT_FIXTURE, "procs_running").unwrap(),
            2
        );
        assert!(parse_stat_scalar(STAT_FIXTURE, "nonexistent").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12288000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       4096000 kB
";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.total_kb, 16384000);
        assert_eq!(info.free_kb, 8192000);
        assert_eq!(info.available_kb, 12288000);
        assert_eq!(info.buffers_kb, 512000);
        assert_eq!(info.cached_kb, 2048000);

        assert!((info.total_mb() - 16000.0).abs() < 1e-9);
        // (16384000 - 8192000 - 512000 - 2048000) / 1024
        assert!((info.used_mb() - 5500.0).abs() < 1e-9);
        assert!((info.available_mb() - 12000.0).abs() < 1e-9);
        // (16384000 - 12288000) / 16384000 * 100
        assert!((info.usage_percent().unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_meminfo_missing_required_keys() {
        assert!(parse_meminfo("MemFree: 100 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: 100 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: 100 kB\nMemAvailable: 50 kB\n").is_ok());
    }

    #[test]
    fn test_meminfo_usage_percent_zero_total() {
        let info = MemInfo::default();
        assert!(info.usage_percent().is_none());
    }

    #[test]
    fn test_meminfo_usage_percent_bounds() {
        let info = MemInfo {
            total_kb: 1000,
            available_kb: 0,
            ..MemInfo::default()
        };
        assert!((info.usage_percent().unwrap() - 100.0).abs() < 1e-9);

        let info = MemInfo {
            total_kb: 1000,
            available_kb: 1000,
            ..MemInfo::default()
        };
        assert!(info.usage_percent().unwrap().abs() < 1e-9);
    }

    const NET_DEV_FIXTURE: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
wlp4s0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
";

    #[test]
    fn test_parse_net_dev_interface() {
        let stats = parse_net_dev_interface(NET_DEV_FIXTURE, "wlp4s0");
        assert_eq!(stats.rx_bytes, 9876543);
        assert_eq!(stats.rx_errors, 1);
        assert_eq!(stats.rx_dropped, 2);
        assert_eq!(stats.tx_bytes, 87654321);
        assert_eq!(stats.tx_errors, 3);
    }

    #[test]
    fn test_parse_net_dev_interface_exact_match_only() {
        // a prefix of an existing interface name must not match its row
        let stats = parse_net_dev_interface(NET_DEV_FIXTURE, "wlp4s");
        assert_eq!(stats, InterfaceStats::default());
    }

    #[test]
    fn test_parse_net_dev_interface_absent_is_all_zero() {
        let stats = parse_net_dev_interface(NET_DEV_FIXTURE, "eth0");
        assert_eq!(stats, InterfaceStats::default());
    }

    #[test]
    fn test_parse_diskstats_totals() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
";
        let totals = parse_diskstats_totals(content);
        assert_eq!(totals.reads_completed, 1234 + 1000 + 9999);
        assert_eq!(totals.writes_completed, 5678 + 5000 + 8888);
        assert_eq!(totals.io_time_ms, 150 + 130 + 1000);
    }

    #[test]
    fn test_parse_diskstats_skips_malformed_lines() {
        let content = "8 0 sda 10\ngarbage\n8 1 sda1 5 0 0 0 7 0 0 0 0 9 0\n";
        let totals = parse_diskstats_totals(content);
        assert_eq!(totals.reads_completed, 5);
        assert_eq!(totals.writes_completed, 7);
        assert_eq!(totals.io_time_ms, 9);
    }

    #[test]
    fn test_parse_sensor_value() {
        assert_eq!(parse_sensor_value("45000\n").unwrap(), 45000);
        assert_eq!(parse_sensor_value("  2100  ").unwrap(), 2100);
        assert!(parse_sensor_value("abc").is_err());
        assert!(parse_sensor_value("").is_err());
    }

    #[test]
    fn test_parse_process_state() {
        assert_eq!(
            parse_process_state("1234 (bash) S 1233 1234 1234 34816").unwrap(),
            'S'
        );
        assert_eq!(parse_process_state("1 (init) R 0").unwrap(), 'R');
        assert!(parse_process_state("1234").is_err());
        assert!(parse_process_state("").is_err());
    }

    #[test]
    fn test_parse_process_state_comm_with_spaces_shifts_fields() {
        // the third field lands inside the comm, not on the state code
        assert_eq!(
            parse_process_state("4321 (Web Content) S 1 4321 4321").unwrap(),
            'C'
        );
    }
}
