//! Run log - append-only record of every run-attempt outcome

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default run-record log file, created in the working directory
pub const LOG_FILE: &str = "task_scheduler.log";

/// Outcome of one scheduling cycle for one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Body executed and returned normally
    Ran,
    /// Cycle ended without executing the body (task has no due time)
    SkippedNotDue,
    /// Body raised an unhandled failure
    Crashed,
    /// Task observed its termination sentinel and stopped
    Terminated,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ran => write!(f, "ran"),
            Self::SkippedNotDue => write!(f, "skipped-not-due"),
            Self::Crashed => write!(f, "crashed"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// A single run-attempt record
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub timestamp: DateTime<Local>,
    pub task: String,
    pub outcome: RunOutcome,
    pub detail: Option<String>,
}

impl RunRecord {
    /// Create a record stamped with the current local time
    pub fn new(task: impl Into<String>, outcome: RunOutcome) -> Self {
        Self {
            timestamp: Local::now(),
            task: task.into(),
            outcome,
            detail: None,
        }
    }

    /// Attach a free-form detail (crash message, retry notice)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.task,
            self.outcome
        )?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Append-only log shared by all supervisors. Holds only the path; every
/// append opens, writes one line, and closes, so concurrent routines never
/// interleave partial lines.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as one line
    pub fn append(&self, record: &RunRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record)?;
        Ok(())
    }

    /// Append, swallowing I/O failures. Run records are best-effort: a
    /// broken log file must not turn into a task failure.
    pub fn record(&self, task: &str, outcome: RunOutcome, detail: Option<String>) {
        let mut record = RunRecord::new(task, outcome);
        if let Some(detail) = detail {
            record = record.with_detail(detail);
        }
        if let Err(e) = self.append(&record) {
            log::warn!("Failed to append run record for '{}': {}", task, e);
        }
    }
}
