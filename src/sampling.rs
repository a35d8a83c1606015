//! The fixed-period sampling loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::registry::ActiveSet;

/// Runs samplers until `running` goes false.
///
/// Every cycle visits each sampler once, in activation order. A failing
/// sampler is logged and skipped for the cycle; its gauges keep their last
/// published values and the remaining samplers still run.
pub fn run(set: &mut ActiveSet, period: Duration, running: &AtomicBool) {
    let mut cycles: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let started = Instant::now();

        for sampler in set.samplers_mut() {
            if let Err(err) = sampler.sample() {
                warn!("Sampling {} failed: {}", sampler.source_name(), err);
            }
        }

        cycles += 1;
        if cycles % 60 == 0 {
            debug!("Completed {} sampling cycles", cycles);
        }

        let elapsed = started.elapsed();
        if elapsed < period {
            sleep_interruptible(period - elapsed, running);
        }
    }
}

/// Sleeps in short slices so shutdown is noticed promptly.
fn sleep_interruptible(total: Duration, running: &AtomicBool) {
    let slice = Duration::from_millis(100);
    let mut remaining = total;
    while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::config::MonitorConfig;
    use crate::registry::activate;

    #[test]
    fn test_failed_sampler_does_not_stop_the_cycle() {
        // context_switches has no backing file and fails every cycle;
        // meminfo succeeds and must still be updated.
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 2048 kB\nMemFree: 512 kB\nMemAvailable: 1024 kB\n",
        );

        let names: Vec<String> = ["context_switches", "total_memory_mb"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut set = activate(fs, MonitorConfig::default(), &names).unwrap();

        let running = AtomicBool::new(true);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(Duration::from_millis(50));
                running.store(false, Ordering::SeqCst);
            });
            run(&mut set, Duration::from_millis(10), &running);
        });

        assert_eq!(
            set.board().snapshot(),
            vec![("context_switches", 0.0), ("total_memory_mb", 2.0)]
        );
    }

    #[test]
    fn test_sleep_interruptible_returns_early_on_shutdown() {
        let running = AtomicBool::new(false);
        let started = Instant::now();
        sleep_interruptible(Duration::from_secs(5), &running);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
