//! Automator - home-automation task supervisor
//!
//! Discovers independently-authored task units under a root directory and
//! runs each on a recurring weekly schedule or fixed interval inside a
//! cooperative execution model, restarting crashed tasks after a cool-down
//! without taking down their siblings.

pub mod config;
pub mod core;
pub mod errors;
pub mod runlog;
pub mod sentinel;
pub mod tasks;

// Re-exports
pub use config::AutomatorConfig;
pub use crate::core::{
    compute_next_run, Orchestrator, Supervisor, SupervisorState, TaskModule, TaskRegistry,
    TaskUnit, TriggerConfig,
};
pub use errors::AutomatorError;
pub use runlog::{RunLog, RunOutcome, RunRecord};
pub use sentinel::{FileSentinel, SignalScope, TerminationSignal};

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
