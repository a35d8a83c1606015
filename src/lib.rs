//! sysgauge - Linux system metrics sampling library.
//!
//! Reads kernel counters from `/proc` and `/sys`, tracks derived rates such
//! as CPU usage, and publishes current values through a mutex-protected
//! gauge board. The `sysgauged` binary wires this into a daemon: a FIFO
//! control channel selects the metrics, a fixed-period loop samples them,
//! and an HTTP endpoint exposes them in Prometheus text format.

pub mod collector;
pub mod config;
pub mod control;
pub mod exposition;
pub mod registry;
pub mod sampling;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
