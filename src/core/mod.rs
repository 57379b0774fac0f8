//! Core engine - trigger parsing, scheduling arithmetic, supervision,
//! orchestration

mod orchestrator;
mod schedule;
mod supervisor;
mod task;
mod trigger;

pub use orchestrator::Orchestrator;
pub use schedule::{compute_next_run, next_interval};
pub use supervisor::{Supervisor, SupervisorState, DEFAULT_COOLDOWN, DEFAULT_IDLE_POLL};
pub use task::{TaskFactory, TaskModule, TaskRegistry, TaskUnit};
pub use trigger::{TriggerConfig, TriggerSpec, TRIGGER_FILE};
