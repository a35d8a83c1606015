//! Process-state census over the numeric entries of `/proc`.

use std::path::Path;

use crate::collector::parser::parse_process_state;
use crate::collector::sources::SampleError;
use crate::collector::traits::FileSystem;

/// Counts of processes per scheduler state.
///
/// `total` counts every process whose stat file was read and parsed,
/// regardless of state; the three classified counters cover `S`, `R` and `D`
/// only, so they need not sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStateCounts {
    pub total: u64,
    pub suspended: u64,
    pub ready: u64,
    pub blocked: u64,
}

/// Scans `/proc` for numeric-named entries and classifies each process by
/// the state code in its stat file.
///
/// Entries that vanish or become unreadable between listing and opening are
/// skipped silently; processes exit all the time and that race is expected.
/// Only a failure to list the directory itself is an error.
pub fn scan_process_states<F: FileSystem>(
    fs: &F,
    proc_path: &str,
) -> Result<ProcessStateCounts, SampleError> {
    let dir = Path::new(proc_path);
    let entries = fs.read_dir(dir).map_err(|source| SampleError::Unavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut counts = ProcessStateCounts::default();

    for entry in entries {
        let is_pid = entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if !is_pid {
            continue;
        }

        let Ok(content) = fs.read_to_string(&entry.join("stat")) else {
            continue;
        };
        let Ok(state) = parse_process_state(&content) else {
            continue;
        };

        counts.total += 1;
        match state {
            'S' => counts.suspended += 1,
            'R' => counts.ready += 1,
            'D' => counts.blocked += 1,
            _ => {}
        }
    }

    Ok(counts)
}
