//! Built-in task modules
//!
//! Real installations register their own modules on top of these; the
//! built-ins exist so a fresh checkout has something to discover and run.

mod helloman;

pub use helloman::Helloman;

use crate::core::TaskRegistry;

/// Registry pre-populated with the built-in tasks. Extend it with
/// [`TaskRegistry::register`] before handing it to the orchestrator.
pub fn default_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.register("helloman", || Box::new(Helloman::new()));
    registry
}
