//! Helloman - the smallest possible task, handy for smoke-testing a setup

use crate::core::TaskModule;
use anyhow::Result;

/// Logs a greeting on every run
#[derive(Debug, Default)]
pub struct Helloman {
    greetings: u64,
}

impl Helloman {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskModule for Helloman {
    fn setup(&mut self) -> Result<()> {
        log::debug!("helloman ready");
        Ok(())
    }

    fn run_once(&mut self) -> Result<()> {
        self.greetings += 1;
        log::info!("Hello man ({} so far)", self.greetings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_count_survives_runs() {
        let mut task = Helloman::new();
        task.setup().unwrap();
        task.run_once().unwrap();
        task.run_once().unwrap();
        assert_eq!(task.greetings, 2);
    }
}
