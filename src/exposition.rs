//! Pull-based exposition of the gauge board over HTTP.
//!
//! One endpoint, `GET /metrics`, rendering every active gauge in the
//! Prometheus text format. Values are read cell by cell, so a scrape may
//! straddle a sampling cycle.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tracing::info;

use crate::registry::gauge::GaugeBoard;

/// Renders the current board in exposition text format.
pub fn render(board: &GaugeBoard) -> String {
    let mut out = String::new();
    for entry in board.iter() {
        out.push_str(&format!(
            "# HELP {name} {help}\n# TYPE {name} gauge\n{name} {value}\n",
            name = entry.def.name,
            help = entry.def.help,
            value = entry.cell.get(),
        ));
    }
    out
}

async fn handle_metrics(State(board): State<GaugeBoard>) -> String {
    render(&board)
}

/// Builds the exposition router.
pub fn router(board: GaugeBoard) -> Router {
    Router::new()
        .route("/metrics", get(handle_metrics))
        .with_state(board)
}

/// Binds the exposition listener.
///
/// Done before the server thread spawns so an address already in use fails
/// the startup instead of leaving a daemon sampling with no endpoint.
pub fn bind(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let listener = std::net::TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Serves the exposition endpoint on an already-bound listener until the
/// process exits.
///
/// Runs a single-threaded runtime; intended to be called from a dedicated
/// thread next to the sampling loop.
pub fn serve_blocking(listener: std::net::TcpListener, board: GaugeBoard) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let addr = listener.local_addr()?;
        let listener = tokio::net::TcpListener::from_std(listener)?;
        info!("Exposition endpoint listening on http://{}/metrics", addr);
        axum::serve(listener, router(board)).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::config::MonitorConfig;
    use crate::registry::activate;

    #[test]
    fn test_render_empty_board() {
        assert_eq!(render(&GaugeBoard::default()), "");
    }

    #[test]
    fn test_bind_rejects_address_in_use() {
        let first = bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let taken = first.local_addr().unwrap();
        assert!(bind(taken).is_err());
    }

    #[test]
    fn test_render_active_gauges() {
        let names: Vec<String> = ["cpu_usage_percentage", "total_memory_mb"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let set = activate(MockFs::new(), MonitorConfig::default(), &names).unwrap();

        let board = set.board();
        for entry in board.iter() {
            if entry.def.name == "cpu_usage_percentage" {
                entry.cell.set(12.5);
            }
        }

        assert_eq!(
            render(&board),
            "# HELP cpu_usage_percentage CPU usage in percentage\n\
             # TYPE cpu_usage_percentage gauge\n\
             cpu_usage_percentage 12.5\n\
             # HELP total_memory_mb Total memory in MB\n\
             # TYPE total_memory_mb gauge\n\
             total_memory_mb 0\n"
        );
    }
}
