//! Runtime configuration for the source readers.

use std::path::PathBuf;

/// Paths and identifiers the readers sample from.
///
/// Defaults match a bare-metal laptop layout; every field is overridable
/// from the command line, and tests point `proc_path` at a mock tree.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Root of the proc filesystem.
    pub proc_path: String,
    /// Mount point whose usage feeds the disk space gauge.
    pub root_path: PathBuf,
    /// Network interface row selected from `/proc/net/dev`.
    pub interface: String,
    /// hwmon file reporting CPU temperature in millidegrees.
    pub cpu_temp_path: PathBuf,
    /// hwmon file reporting battery voltage in millivolts.
    pub battery_voltage_path: PathBuf,
    /// hwmon file reporting battery current in milliamperes.
    pub battery_current_path: PathBuf,
    /// cpufreq file reporting the current frequency in kHz.
    pub cpu_freq_path: PathBuf,
    /// hwmon tachometer for the CPU fan, in RPM.
    pub cpu_fan_path: PathBuf,
    /// hwmon tachometer for the GPU fan, in RPM.
    pub gpu_fan_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            proc_path: "/proc".to_string(),
            root_path: PathBuf::from("/"),
            interface: "wlp4s0".to_string(),
            cpu_temp_path: PathBuf::from("/sys/class/hwmon/hwmon4/temp1_input"),
            battery_voltage_path: PathBuf::from("/sys/class/hwmon/hwmon2/in0_input"),
            battery_current_path: PathBuf::from("/sys/class/hwmon/hwmon2/curr1_input"),
            cpu_freq_path: PathBuf::from(
                "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq",
            ),
            cpu_fan_path: PathBuf::from("/sys/class/hwmon/hwmon5/fan1_input"),
            gpu_fan_path: PathBuf::from("/sys/class/hwmon/hwmon5/fan2_input"),
        }
    }
}
