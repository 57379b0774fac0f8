//! Orchestrator configuration - optional `automator.yml` with defaults

use crate::runlog::LOG_FILE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file searched in the working directory
pub const CONFIG_FILE: &str = "automator.yml";

/// Orchestrator-level settings. Every field has a default so the binary runs
/// with no config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatorConfig {
    /// Directory scanned for task subdirectories
    #[serde(default = "default_tasks_root")]
    pub tasks_root: PathBuf,
    /// Seconds a crashed task waits before its fresh instance starts
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Poll period for tasks with neither trigger mode enabled
    #[serde(default = "default_idle_poll_secs")]
    pub idle_poll_secs: u64,
    /// Run-record log file
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_tasks_root() -> PathBuf {
    PathBuf::from("tasks")
}

fn default_cooldown_secs() -> u64 {
    5
}

fn default_idle_poll_secs() -> u64 {
    10
}

fn default_log_file() -> PathBuf {
    PathBuf::from(LOG_FILE)
}

impl Default for AutomatorConfig {
    fn default() -> Self {
        Self {
            tasks_root: default_tasks_root(),
            cooldown_secs: default_cooldown_secs(),
            idle_poll_secs: default_idle_poll_secs(),
            log_file: default_log_file(),
        }
    }
}

impl AutomatorConfig {
    /// Load config from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AutomatorConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `automator.yml` from the working directory, falling back to
    /// defaults when it is absent.
    pub fn auto_load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs)
    }
}
