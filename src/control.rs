//! The FIFO control channel and status artifacts.
//!
//! A launcher writes one request line into the FIFO: either the catalog
//! sentinel `1`, or a comma-separated list of metric names to monitor. The
//! daemon answers a sentinel with a catalog dump and exits; a name list
//! starts a monitoring run.

use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::debug;

use crate::registry::catalog::CATALOG;

/// A parsed control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// Dump the metric catalog and exit.
    ShowCatalog,
    /// Activate the named metrics and start sampling.
    Monitor(Vec<String>),
}

/// Parses one request line.
///
/// Tokens are comma-separated and trimmed; empty tokens are dropped, so
/// trailing commas and stray whitespace are harmless. A leading `1` token
/// is the catalog sentinel.
pub fn parse_request(line: &str) -> ControlRequest {
    let tokens: Vec<String> = line
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.first().map(String::as_str) == Some("1") {
        return ControlRequest::ShowCatalog;
    }
    ControlRequest::Monitor(tokens)
}

/// Creates the control FIFO if it does not already exist.
pub fn ensure_fifo(path: &Path) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o666) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(err);
        }
    }
    Ok(())
}

/// Blocks until a writer delivers a request line, then parses it.
pub fn read_request(path: &Path) -> io::Result<ControlRequest> {
    debug!("Waiting for control request on {}", path.display());
    let content = std::fs::read_to_string(path)?;
    Ok(parse_request(&content))
}

/// Writes the full catalog, one `Metric: <name>` line per entry.
pub fn write_catalog(out: &mut impl Write) -> io::Result<()> {
    for def in CATALOG {
        writeln!(out, "Metric: {}", def.name)?;
    }
    Ok(())
}

/// Overwrites the status file with a single line.
pub fn write_status(path: &Path, status: &str) -> io::Result<()> {
    std::fs::write(path, format!("{}\n", status))
}
