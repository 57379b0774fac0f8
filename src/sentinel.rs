//! Termination sentinels - out-of-band stop markers for running tasks
//!
//! An operator (or another process) stops tasks by leaving marker files in
//! the task root: `all.terminate` stops every task, `<task>.terminate` stops
//! one. Existence is the signal; content is ignored. The core only reads
//! markers during a run and deletes stale ones at startup.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

/// Marker file that stops every task
pub const GLOBAL_SENTINEL: &str = "all.terminate";
/// Suffix of task-scoped markers: `<task>.terminate`
pub const SENTINEL_SUFFIX: &str = ".terminate";

/// Scope a termination check applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalScope<'a> {
    /// Stop everything
    All,
    /// Stop one named task
    Task(&'a str),
}

/// External stop-signal capability. Kept behind a trait so the filesystem
/// markers can be swapped for another mechanism without touching the
/// scheduler.
pub trait TerminationSignal: Send + Sync {
    fn is_set(&self, scope: SignalScope<'_>) -> bool;
}

/// A task stops when either the global marker or its own marker is present.
pub fn should_terminate(signal: &dyn TerminationSignal, task: &str) -> bool {
    signal.is_set(SignalScope::All) || signal.is_set(SignalScope::Task(task))
}

/// Filesystem sentinel rooted at the task directory
#[derive(Debug, Clone)]
pub struct FileSentinel {
    root: PathBuf,
}

impl FileSentinel {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Delete markers left over from a previous run. Tasks would otherwise
    /// stop immediately on startup. Returns how many were removed.
    pub fn clear_stale(&self) -> Result<usize> {
        if !self.root.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_file() && name.ends_with(SENTINEL_SUFFIX) {
                fs::remove_file(&path)?;
                log::info!("Removed stale sentinel: {}", name);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl TerminationSignal for FileSentinel {
    fn is_set(&self, scope: SignalScope<'_>) -> bool {
        let marker = match scope {
            SignalScope::All => self.root.join(GLOBAL_SENTINEL),
            SignalScope::Task(name) => self.root.join(format!("{}{}", name, SENTINEL_SUFFIX)),
        };
        marker.exists()
    }
}
