//! Error taxonomy - the failures that surface to the operator
//!
//! Task body failures are deliberately absent: the supervisor absorbs them
//! (logged and retried), so they never appear at this level.

use thiserror::Error;

/// Operator-facing errors.
#[derive(Debug, Error)]
pub enum AutomatorError {
    /// Malformed or contradictory trigger configuration. Fails that task's
    /// discovery only; sibling tasks are unaffected.
    #[error("invalid trigger configuration: {0}")]
    Configuration(String),

    /// Task directory is missing a required entry point. Same policy as
    /// `Configuration`: that task is skipped, the others continue.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// The debug entry point was given a name no discovered task matches.
    #[error("task '{0}' not found")]
    TaskNotFound(String),
}
