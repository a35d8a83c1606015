//! sysgauged - System metrics sampling daemon.
//!
//! Waits on a control FIFO for a metric selection, then samples the chosen
//! kernel counters on a fixed period and exposes them over HTTP in
//! Prometheus text format.

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use sysgauge::collector::RealFs;
use sysgauge::config::MonitorConfig;
use sysgauge::control::{self, ControlRequest};
use sysgauge::registry::activate;
use sysgauge::{exposition, sampling};

/// System metrics sampling daemon.
#[derive(Parser)]
#[command(name = "sysgauged", about = "System metrics sampling daemon", version)]
struct Args {
    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "1")]
    interval: u64,

    /// Listen address for the exposition endpoint.
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// Path of the control FIFO.
    #[arg(long, default_value = "/tmp/monitor_fifo")]
    fifo: PathBuf,

    /// Path of the status file.
    #[arg(long, default_value = "/tmp/monitor_status")]
    status_file: PathBuf,

    /// Path of the catalog report written for the sentinel request.
    #[arg(long, default_value = "/tmp/monitor_metrics")]
    report_file: PathBuf,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Mount point measured by the disk usage gauge.
    #[arg(long, default_value = "/")]
    root_path: PathBuf,

    /// Network interface monitored in /proc/net/dev.
    #[arg(long, default_value = "wlp4s0")]
    interface: String,

    /// Override for the CPU temperature sensor file.
    #[arg(long, value_name = "PATH")]
    cpu_temp_path: Option<PathBuf>,

    /// Override for the battery voltage sensor file.
    #[arg(long, value_name = "PATH")]
    battery_voltage_path: Option<PathBuf>,

    /// Override for the battery current sensor file.
    #[arg(long, value_name = "PATH")]
    battery_current_path: Option<PathBuf>,

    /// Override for the CPU frequency file.
    #[arg(long, value_name = "PATH")]
    cpu_freq_path: Option<PathBuf>,

    /// Override for the CPU fan tachometer file.
    #[arg(long, value_name = "PATH")]
    cpu_fan_path: Option<PathBuf>,

    /// Override for the GPU fan tachometer file.
    #[arg(long, value_name = "PATH")]
    gpu_fan_path: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for directive in [
        format!("sysgauged={}", level),
        format!("sysgauge={}", level),
    ] {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("bad log directive '{}': {}", directive, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn monitor_config(args: &Args) -> MonitorConfig {
    let mut config = MonitorConfig {
        proc_path: args.proc_path.clone(),
        root_path: args.root_path.clone(),
        interface: args.interface.clone(),
        ..MonitorConfig::default()
    };
    if let Some(ref path) = args.cpu_temp_path {
        config.cpu_temp_path = path.clone();
    }
    if let Some(ref path) = args.battery_voltage_path {
        config.battery_voltage_path = path.clone();
    }
    if let Some(ref path) = args.battery_current_path {
        config.battery_current_path = path.clone();
    }
    if let Some(ref path) = args.cpu_freq_path {
        config.cpu_freq_path = path.clone();
    }
    if let Some(ref path) = args.cpu_fan_path {
        config.cpu_fan_path = path.clone();
    }
    if let Some(ref path) = args.gpu_fan_path {
        config.gpu_fan_path = path.clone();
    }
    config
}

/// Best-effort status file update; a failure is logged, never fatal.
fn update_status(args: &Args, status: &str) {
    if let Err(e) = control::write_status(&args.status_file, status) {
        warn!(
            "Failed to write status file {}: {}",
            args.status_file.display(),
            e
        );
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("sysgauged {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, listen={}, fifo={}, interface={}",
        args.interval,
        args.listen,
        args.fifo.display(),
        args.interface
    );

    let listen_addr: SocketAddr = match args.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid listen address '{}': {}", args.listen, e);
            process::exit(1);
        }
    };

    if let Err(e) = control::ensure_fifo(&args.fifo) {
        error!("Cannot create control FIFO {}: {}", args.fifo.display(), e);
        process::exit(1);
    }
    update_status(&args, "Starting monitoring from FIFO");

    let request = match control::read_request(&args.fifo) {
        Ok(request) => request,
        Err(e) => {
            error!("Cannot read control FIFO {}: {}", args.fifo.display(), e);
            update_status(&args, "Error reading control FIFO");
            process::exit(1);
        }
    };
    // the FIFO is single-use; remove it once the request is in
    if let Err(e) = std::fs::remove_file(&args.fifo) {
        warn!("Failed to remove FIFO {}: {}", args.fifo.display(), e);
    }

    let names = match request {
        ControlRequest::ShowCatalog => {
            match std::fs::File::create(&args.report_file)
                .and_then(|mut file| control::write_catalog(&mut file).and_then(|_| file.flush()))
            {
                Ok(()) => {
                    info!("Catalog written to {}", args.report_file.display());
                }
                Err(e) => {
                    error!(
                        "Cannot write catalog to {}: {}",
                        args.report_file.display(),
                        e
                    );
                    process::exit(1);
                }
            }
            return;
        }
        ControlRequest::Monitor(names) => names,
    };

    if names.is_empty() {
        warn!("Empty metric selection, nothing to monitor");
        update_status(&args, "Empty metric selection");
        return;
    }

    let config = monitor_config(&args);
    let mut set = match activate(RealFs::new(), config, &names) {
        Ok(set) => set,
        Err(e) => {
            error!("Activation failed: {}", e);
            update_status(&args, &format!("Error: {}", e));
            process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let listener = match exposition::bind(listen_addr) {
        Ok(listener) => listener,
        Err(e) => {
            error!("Cannot bind exposition endpoint {}: {}", listen_addr, e);
            update_status(&args, &format!("Error binding {}", listen_addr));
            process::exit(1);
        }
    };
    let board = set.board();
    std::thread::spawn(move || {
        if let Err(e) = exposition::serve_blocking(listener, board) {
            error!("Exposition endpoint failed: {}", e);
        }
    });

    update_status(&args, "Metrics monitoring started");
    sampling::run(&mut set, Duration::from_secs(args.interval), &running);

    update_status(&args, "Monitoring stopped");
    info!("Shutdown complete");
}
