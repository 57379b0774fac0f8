//! Orchestrator - task discovery and the cooperative run loop

use super::supervisor::Supervisor;
use super::task::{TaskRegistry, TaskUnit};
use super::trigger::{TriggerConfig, TRIGGER_FILE};
use crate::config::AutomatorConfig;
use crate::errors::AutomatorError;
use crate::runlog::RunLog;
use crate::sentinel::{FileSentinel, TerminationSignal};
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Discovers task units under the configured root and drives them as
/// cooperative routines until every one of them stops.
pub struct Orchestrator {
    config: AutomatorConfig,
    registry: TaskRegistry,
}

impl Orchestrator {
    pub fn new(config: AutomatorConfig, registry: TaskRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &AutomatorConfig {
        &self.config
    }

    /// Walk the task root and build a unit per well-formed task directory.
    /// A task candidate is an immediate subdirectory containing a
    /// `trigger.json`. A malformed candidate is logged and skipped; it never
    /// aborts discovery of the others.
    pub fn discover(&self) -> Result<Vec<TaskUnit>> {
        let root = &self.config.tasks_root;
        if !root.is_dir() {
            anyhow::bail!("task root {} does not exist", root.display());
        }

        let mut entries: Vec<_> = fs::read_dir(root)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());

        let mut units = Vec::new();
        for entry in entries {
            let dir = entry.path();
            if !dir.is_dir() || !dir.join(TRIGGER_FILE).is_file() {
                continue;
            }
            let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string)
            else {
                continue;
            };

            match self.build_unit(&name, &dir) {
                Ok(unit) => {
                    log::info!("Discovered task '{}' ({})", name, unit.trigger);
                    units.push(unit);
                }
                Err(e) => {
                    log::warn!("Skipping task '{}': {}", name, e);
                }
            }
        }
        Ok(units)
    }

    fn build_unit(&self, name: &str, dir: &Path) -> Result<TaskUnit, AutomatorError> {
        let trigger = TriggerConfig::from_file(&dir.join(TRIGGER_FILE))?;
        let factory = self.registry.get(name).ok_or_else(|| {
            AutomatorError::Discovery(format!("no registered task module named '{}'", name))
        })?;
        Ok(TaskUnit::new(name, dir, trigger, factory))
    }

    /// Run every discovered task until all of them stop
    pub async fn run(&self) -> Result<()> {
        let units = self.discover()?;
        if units.is_empty() {
            log::warn!(
                "No tasks discovered under {}",
                self.config.tasks_root.display()
            );
            return Ok(());
        }
        log::info!("Starting {} task(s)", units.len());
        self.run_units(units).await
    }

    /// Debug entry point: run exactly one named task, with the same
    /// supervision semantics as a full run.
    pub async fn run_single(&self, task_name: &str) -> Result<()> {
        let units = self.discover()?;
        let unit = units
            .into_iter()
            .find(|u| u.name == task_name)
            .ok_or_else(|| AutomatorError::TaskNotFound(task_name.to_string()))?;
        log::info!("Running single task '{}'", task_name);
        self.run_units(vec![unit]).await
    }

    async fn run_units(&self, units: Vec<TaskUnit>) -> Result<()> {
        let sentinel = FileSentinel::new(&self.config.tasks_root);
        sentinel.clear_stale()?;
        let signal: Arc<dyn TerminationSignal> = Arc::new(sentinel);
        let run_log = RunLog::new(&self.config.log_file);

        let mut routines = JoinSet::new();
        for unit in units {
            let supervisor = Supervisor::new(unit, signal.clone(), run_log.clone())
                .with_timing(self.config.cooldown(), self.config.idle_poll());
            routines.spawn(supervisor.run());
        }

        while let Some(joined) = routines.join_next().await {
            if let Err(e) = joined {
                // Supervisors absorb task failures; reaching here means the
                // routine itself was cancelled or panicked.
                log::error!("Supervisor routine aborted: {}", e);
            }
        }
        log::info!("All tasks stopped");
        Ok(())
    }
}
