//! CPU utilization derived from successive `/proc/stat` snapshots.
//!
//! The only stateful computation in the crate: usage is a rate over two
//! cumulative-counter snapshots, so the tracker carries the previous one
//! between sampling cycles.

use crate::collector::parser::CpuTicks;
use crate::collector::sources::SampleError;

/// Converts pairs of cumulative tick snapshots into a usage percentage.
///
/// The very first call seeds the tracker and reports
/// [`SampleError::NotReady`]; the gauge keeps its default value until the
/// second cycle.
#[derive(Debug, Default)]
pub struct CpuUsageTracker {
    prev: Option<CpuTicks>,
}

impl CpuUsageTracker {
    /// Creates a tracker with no previous snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes usage% from the previous snapshot to `current`.
    ///
    /// Zero elapsed ticks (two reads within the same jiffy) report
    /// [`SampleError::NoElapsedTicks`] and keep the previous snapshot, so the
    /// next cycle measures the full interval. A counter regression also
    /// reports `NoElapsedTicks` but reseeds from `current`, costing one cycle
    /// instead of wedging the metric.
    pub fn update(&mut self, current: CpuTicks) -> Result<f64, SampleError> {
        let Some(prev) = self.prev else {
            self.prev = Some(current);
            return Err(SampleError::NotReady);
        };

        let total = current.total();
        let prev_total = prev.total();

        if total < prev_total {
            self.prev = Some(current);
            return Err(SampleError::NoElapsedTicks);
        }
        if total == prev_total {
            return Err(SampleError::NoElapsedTicks);
        }

        let total_delta = (total - prev_total) as f64;
        let idle_delta =
            current.idle_total().saturating_sub(prev.idle_total()) as f64;
        let usage = (total_delta - idle_delta) / total_delta * 100.0;

        self.prev = Some(current);
        Ok(usage)
    }
}
