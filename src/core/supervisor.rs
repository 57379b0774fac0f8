//! Crash-recovery supervisor - wraps one task unit as a cooperative routine
//!
//! The supervisor owns the whole lifecycle of one task: it sleeps until the
//! task is due, runs the body, logs the outcome, and turns any unhandled
//! failure into a cool-down plus a fresh module instance instead of letting
//! it escape into the scheduler. Retries are unbounded: a persistently
//! failing task keeps retrying at the cool-down cadence, one log record per
//! failure.

use super::schedule::{compute_next_run, next_interval};
use super::task::{TaskModule, TaskUnit};
use crate::runlog::{RunLog, RunOutcome};
use crate::sentinel::{should_terminate, TerminationSignal};
use chrono::{Local, NaiveDateTime};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Cool-down before a crashed task is re-instantiated
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);
/// Poll period for tasks with neither trigger mode enabled
pub const DEFAULT_IDLE_POLL: Duration = Duration::from_secs(10);

/// Supervisor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Waiting for the next due instant
    Idle,
    /// Executing the task body
    Running,
    /// Body returned normally
    Completed,
    /// Body raised an unhandled failure
    Failed,
    /// Terminal: sentinel observed, routine exits
    Stopped,
}

/// Wraps one task unit so a crash is logged and retried after a cool-down
/// instead of taking down the sibling tasks or the process.
pub struct Supervisor {
    unit: TaskUnit,
    signal: Arc<dyn TerminationSignal>,
    run_log: RunLog,
    cooldown: Duration,
    idle_poll: Duration,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(unit: TaskUnit, signal: Arc<dyn TerminationSignal>, run_log: RunLog) -> Self {
        Self {
            unit,
            signal,
            run_log,
            cooldown: DEFAULT_COOLDOWN,
            idle_poll: DEFAULT_IDLE_POLL,
            state: SupervisorState::Idle,
        }
    }

    /// Override the cool-down and idle-poll periods
    pub fn with_timing(mut self, cooldown: Duration, idle_poll: Duration) -> Self {
        self.cooldown = cooldown;
        self.idle_poll = idle_poll;
        self
    }

    pub fn task_name(&self) -> &str {
        &self.unit.name
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Drive the task until its sentinel appears. This is the entire
    /// cooperative routine: it only ever suspends on timed sleeps, and the
    /// body itself is never interrupted once started.
    pub async fn run(mut self) {
        let task = self.unit.name.clone();
        log::info!("Supervising task '{}' ({})", task, self.unit.trigger);

        let Some(mut module) = self.instantiate_supervised().await else {
            return;
        };

        self.unit.next_run = self.fresh_anchor();
        // Give sibling routines a turn before settling into the first wait.
        tokio::task::yield_now().await;

        loop {
            // Sentinel check: once per cycle, at the idle-to-running
            // decision point.
            if should_terminate(self.signal.as_ref(), &task) {
                self.stop();
                return;
            }

            self.state = SupervisorState::Idle;
            let now = Local::now().naive_local();

            let Some(due) = self.unit.next_run else {
                // Neither trigger mode is enabled: never run the body, keep
                // polling so a sentinel is still honored.
                self.run_log.record(&task, RunOutcome::SkippedNotDue, None);
                sleep(self.idle_poll).await;
                continue;
            };

            if now < due {
                let wait = (due - now).to_std().unwrap_or(Duration::ZERO);
                sleep(wait).await;
                // Re-enter the loop so the sentinel is checked on wake.
                continue;
            }

            self.state = SupervisorState::Running;
            match run_body(module.as_mut()) {
                Ok(()) => {
                    self.state = SupervisorState::Completed;
                    log::info!("Task '{}' ran", task);
                    self.run_log.record(&task, RunOutcome::Ran, None);
                    self.unit.next_run = self.anchor_after_run();
                }
                Err(failure) => {
                    self.state = SupervisorState::Failed;
                    log::warn!(
                        "Task '{}' crashed: {}; restarting in {:?}",
                        task,
                        failure,
                        self.cooldown
                    );
                    self.run_log.record(&task, RunOutcome::Crashed, Some(failure));

                    sleep(self.cooldown).await;
                    let Some(fresh) = self.instantiate_supervised().await else {
                        return;
                    };
                    module = fresh;
                    self.unit.next_run = self.fresh_anchor();
                }
            }
        }
    }

    /// Build a fresh module instance, retrying a failing initializer at the
    /// cool-down cadence. Returns `None` when a sentinel appeared between
    /// attempts.
    async fn instantiate_supervised(&mut self) -> Option<Box<dyn TaskModule>> {
        loop {
            if should_terminate(self.signal.as_ref(), &self.unit.name) {
                self.stop();
                return None;
            }

            match catch_unwind(AssertUnwindSafe(|| self.unit.instantiate())) {
                Ok(Ok(module)) => {
                    log::debug!("Task '{}' initialized", self.unit.name);
                    return Some(module);
                }
                Ok(Err(e)) => self.setup_failed(format!("{:#}", e)).await,
                Err(panic) => self.setup_failed(panic_message(panic)).await,
            }
        }
    }

    async fn setup_failed(&mut self, failure: String) {
        self.state = SupervisorState::Failed;
        log::warn!(
            "Task '{}' failed to initialize: {}; retrying in {:?}",
            self.unit.name,
            failure,
            self.cooldown
        );
        self.run_log
            .record(&self.unit.name, RunOutcome::Crashed, Some(failure));
        sleep(self.cooldown).await;
    }

    fn stop(&mut self) {
        self.state = SupervisorState::Stopped;
        log::info!("Task '{}' terminated by sentinel", self.unit.name);
        self.run_log.record(&self.unit.name, RunOutcome::Terminated, None);
    }

    /// Anchor for a fresh instance, straight from the calculator. A trigger
    /// invalid enough to fail here was rejected at discovery; if one slips
    /// through anyway the task degrades to idle polling.
    fn fresh_anchor(&self) -> Option<NaiveDateTime> {
        match compute_next_run(&self.unit.trigger, Local::now().naive_local()) {
            Ok(next) => next,
            Err(e) => {
                log::error!("Task '{}' has an unschedulable trigger: {}", self.unit.name, e);
                None
            }
        }
    }

    /// Anchor after a completed run. Interval mode takes over pacing once a
    /// run has completed; otherwise the weekly schedule is recomputed.
    fn anchor_after_run(&self) -> Option<NaiveDateTime> {
        if self.unit.trigger.timeout_on {
            Some(next_interval(&self.unit.trigger, Local::now().naive_local()))
        } else {
            self.fresh_anchor()
        }
    }
}

/// Run the body once, converting both an `Err` return and a panic into a
/// printable failure.
fn run_body(module: &mut dyn TaskModule) -> Result<(), String> {
    match catch_unwind(AssertUnwindSafe(|| module.run_once())) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(panic) => Err(panic_message(panic)),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
