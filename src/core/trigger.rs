//! Trigger configuration - per-task `trigger.json` parsing and validation

use crate::errors::AutomatorError;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Per-task trigger file name
pub const TRIGGER_FILE: &str = "trigger.json";

/// Raw record mirroring `trigger.json`. Every field defaults so a partial
/// file parses; validation happens in the conversion to [`TriggerConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Weekday/time-of-day scheduling active
    #[serde(default)]
    pub schedule_on: bool,
    /// Weekday names eligible for a scheduled run ("Monday", "mon", ...)
    #[serde(default)]
    pub days_of_week: Vec<String>,
    /// Target time on eligible days, 24-hour "HH:MM"
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,
    /// Fixed-interval re-trigger active
    #[serde(default)]
    pub timeout_on: bool,
    /// Seconds between interval-mode re-triggers
    #[serde(default)]
    pub timeout_interval: u64,
}

fn default_time_of_day() -> String {
    "00:00".to_string()
}

/// Validated trigger configuration. Both flags off is a defined idle state,
/// not an error: the task polls for its sentinel and never runs its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    pub schedule_on: bool,
    pub days_of_week: Vec<Weekday>,
    pub time_of_day: NaiveTime,
    pub timeout_on: bool,
    pub timeout_interval: Duration,
}

impl TriggerConfig {
    /// Interval-only trigger: re-run at a fixed cadence, calendar ignored
    pub fn interval(every: Duration) -> Self {
        Self {
            schedule_on: false,
            days_of_week: Vec::new(),
            time_of_day: NaiveTime::MIN,
            timeout_on: true,
            timeout_interval: every,
        }
    }

    /// Weekly trigger: run on the given weekdays at the given time
    pub fn weekly(days_of_week: Vec<Weekday>, time_of_day: NaiveTime) -> Self {
        Self {
            schedule_on: true,
            days_of_week,
            time_of_day,
            timeout_on: false,
            timeout_interval: Duration::ZERO,
        }
    }

    /// Load and validate a task's trigger file
    pub fn from_file(path: &Path) -> Result<Self, AutomatorError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AutomatorError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let spec: TriggerSpec = serde_json::from_str(&content).map_err(|e| {
            AutomatorError::Configuration(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        Self::from_spec(spec)
    }

    /// Validate a raw record
    pub fn from_spec(spec: TriggerSpec) -> Result<Self, AutomatorError> {
        let mut days_of_week = Vec::with_capacity(spec.days_of_week.len());
        for day in &spec.days_of_week {
            let parsed: Weekday = day
                .parse()
                .map_err(|_| AutomatorError::Configuration(format!("unknown weekday '{}'", day)))?;
            if !days_of_week.contains(&parsed) {
                days_of_week.push(parsed);
            }
        }

        if spec.schedule_on && days_of_week.is_empty() {
            return Err(AutomatorError::Configuration(
                "schedule_on is set but days_of_week is empty".to_string(),
            ));
        }

        let time_of_day = NaiveTime::parse_from_str(&spec.time_of_day, "%H:%M").map_err(|_| {
            AutomatorError::Configuration(format!(
                "time_of_day '{}' is not 24-hour HH:MM",
                spec.time_of_day
            ))
        })?;

        Ok(Self {
            schedule_on: spec.schedule_on,
            days_of_week,
            time_of_day,
            timeout_on: spec.timeout_on,
            timeout_interval: Duration::from_secs(spec.timeout_interval),
        })
    }

    /// Neither trigger mode is enabled
    pub fn is_idle(&self) -> bool {
        !self.schedule_on && !self.timeout_on
    }
}

impl fmt::Display for TriggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = || {
            self.days_of_week
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        match (self.schedule_on, self.timeout_on) {
            (false, false) => write!(f, "idle"),
            (true, false) => write!(f, "{} at {}", days(), self.time_of_day.format("%H:%M")),
            (false, true) => write!(f, "every {}s", self.timeout_interval.as_secs()),
            (true, true) => write!(
                f,
                "{} at {}, then every {}s",
                days(),
                self.time_of_day.format("%H:%M"),
                self.timeout_interval.as_secs()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_trigger_parses() {
        let json = r#"{
            "schedule_on": true,
            "days_of_week": ["Monday", "Wednesday", "Friday"],
            "time_of_day": "12:44",
            "timeout_on": false,
            "timeout_interval": 15
        }"#;
        let spec: TriggerSpec = serde_json::from_str(json).unwrap();
        let config = TriggerConfig::from_spec(spec).unwrap();

        assert!(config.schedule_on);
        assert_eq!(
            config.days_of_week,
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
        assert_eq!(config.time_of_day, NaiveTime::from_hms_opt(12, 44, 0).unwrap());
        assert!(!config.timeout_on);
        assert_eq!(config.timeout_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_partial_trigger_defaults_to_idle() {
        let spec: TriggerSpec = serde_json::from_str("{}").unwrap();
        let config = TriggerConfig::from_spec(spec).unwrap();
        assert!(config.is_idle());
        assert_eq!(config.time_of_day, NaiveTime::MIN);
    }

    #[test]
    fn test_short_weekday_names_accepted() {
        let json = r#"{"schedule_on": true, "days_of_week": ["mon", "sun"]}"#;
        let spec: TriggerSpec = serde_json::from_str(json).unwrap();
        let config = TriggerConfig::from_spec(spec).unwrap();
        assert_eq!(config.days_of_week, vec![Weekday::Mon, Weekday::Sun]);
    }

    #[test]
    fn test_duplicate_days_collapse() {
        let json = r#"{"schedule_on": true, "days_of_week": ["Monday", "monday", "Mon"]}"#;
        let spec: TriggerSpec = serde_json::from_str(json).unwrap();
        let config = TriggerConfig::from_spec(spec).unwrap();
        assert_eq!(config.days_of_week, vec![Weekday::Mon]);
    }

    #[test]
    fn test_unknown_weekday_rejected() {
        let json = r#"{"schedule_on": true, "days_of_week": ["Moonday"]}"#;
        let spec: TriggerSpec = serde_json::from_str(json).unwrap();
        let err = TriggerConfig::from_spec(spec).unwrap_err();
        assert!(matches!(err, AutomatorError::Configuration(_)));
        assert!(err.to_string().contains("Moonday"));
    }

    #[test]
    fn test_schedule_with_empty_days_rejected() {
        let json = r#"{"schedule_on": true}"#;
        let spec: TriggerSpec = serde_json::from_str(json).unwrap();
        let err = TriggerConfig::from_spec(spec).unwrap_err();
        assert!(matches!(err, AutomatorError::Configuration(_)));
    }

    #[test]
    fn test_bad_time_of_day_rejected() {
        let json = r#"{"time_of_day": "9am"}"#;
        let spec: TriggerSpec = serde_json::from_str(json).unwrap();
        let err = TriggerConfig::from_spec(spec).unwrap_err();
        assert!(err.to_string().contains("9am"));
    }

    #[test]
    fn test_display_summaries() {
        let idle = TriggerConfig::from_spec(serde_json::from_str("{}").unwrap()).unwrap();
        assert_eq!(idle.to_string(), "idle");

        let interval = TriggerConfig::interval(Duration::from_secs(900));
        assert_eq!(interval.to_string(), "every 900s");

        let weekly = TriggerConfig::weekly(
            vec![Weekday::Mon, Weekday::Fri],
            NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
        );
        assert_eq!(weekly.to_string(), "Mon,Fri at 07:30");
    }
}
