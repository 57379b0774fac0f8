//! Task units - lifecycle hooks, factory registry, per-task scheduling state

use super::trigger::TriggerConfig;
use anyhow::Result;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Lifecycle hooks of one task. Implementations hold whatever state the body
/// needs between runs; after a crash the supervisor discards the whole
/// instance and builds a new one from the factory, so nothing corrupted
/// survives a restart.
pub trait TaskModule: Send {
    /// One-time initializer, re-run on every fresh instance.
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Execute the task body once. May block for as long as it needs; in the
    /// cooperative model this suspends every other task until it returns.
    fn run_once(&mut self) -> Result<()>;
}

/// Builds a fresh, not-yet-initialized module instance
pub type TaskFactory = Arc<dyn Fn() -> Box<dyn TaskModule> + Send + Sync>;

/// Name-to-factory map populated at startup. This is the static-linking
/// counterpart of loading task code out of the task directory itself: the
/// directory supplies the trigger configuration, the registry supplies the
/// hooks.
#[derive(Default, Clone)]
pub struct TaskRegistry {
    factories: HashMap<String, TaskFactory>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the module factory for a task name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn TaskModule> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<TaskFactory> {
        self.factories.get(name).cloned()
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// One discovered, independently schedulable unit of work. Owned exclusively
/// by its supervisor; no task observes another's state.
pub struct TaskUnit {
    /// Task directory name, unique under the task root
    pub name: String,
    /// The directory the unit was discovered in
    pub dir: PathBuf,
    pub trigger: TriggerConfig,
    /// Next due instant; `None` while idling
    pub next_run: Option<NaiveDateTime>,
    factory: TaskFactory,
}

impl TaskUnit {
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        trigger: TriggerConfig,
        factory: TaskFactory,
    ) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            trigger,
            next_run: None,
            factory,
        }
    }

    /// Build a fresh module instance and run its initializer
    pub fn instantiate(&self) -> Result<Box<dyn TaskModule>> {
        let mut module = (self.factory)();
        module.setup()?;
        Ok(module)
    }
}
