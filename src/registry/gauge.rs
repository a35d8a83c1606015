//! Gauge storage cells and the shared board the exposition endpoint reads.

use std::sync::{Arc, Mutex};

use crate::registry::catalog::MetricDef;

/// A single current gauge value behind a lock.
///
/// Written only by the metric's sampler, read by the exposition endpoint.
/// The lock guarantees a reader never observes a torn double-precision
/// write; it does not make composite groups transactional (a scrape may see
/// some cells of a group updated and others stale, an accepted staleness
/// window).
#[derive(Debug, Clone, Default)]
pub struct GaugeCell {
    value: Arc<Mutex<f64>>,
}

impl GaugeCell {
    /// Creates a cell holding 0.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a new value.
    pub fn set(&self, value: f64) {
        *self.lock() = value;
    }

    /// Reads the most recently published value.
    pub fn get(&self) -> f64 {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, f64> {
        // A poisoned lock only means a panicking thread died mid-write of an
        // f64; the value is still whole, so keep serving it.
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One activated metric on the board.
#[derive(Debug, Clone)]
pub struct BoardEntry {
    pub def: &'static MetricDef,
    pub cell: GaugeCell,
}

/// The ordered set of activated gauges, shared with the exposition thread.
///
/// Entries appear in activation-request order and the board shape never
/// changes after activation.
#[derive(Debug, Clone, Default)]
pub struct GaugeBoard {
    entries: Arc<Vec<BoardEntry>>,
}

impl GaugeBoard {
    pub(crate) fn new(entries: Vec<BoardEntry>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Number of active gauges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no metric was activated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the active gauges in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &BoardEntry> {
        self.entries.iter()
    }

    /// Current value of every active gauge, keyed by metric name.
    ///
    /// Each cell is read under its own lock; values from one snapshot may
    /// straddle a sampling cycle.
    pub fn snapshot(&self) -> Vec<(&'static str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.def.name, e.cell.get()))
            .collect()
    }
}
