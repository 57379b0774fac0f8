//! Next-run calculation - pure scheduling arithmetic for task triggers

use super::trigger::TriggerConfig;
use crate::errors::AutomatorError;
use chrono::{Datelike, Days, NaiveDateTime};

/// Compute the next instant a task is due, relative to `now`.
///
/// Returns `Ok(None)` when neither trigger mode is enabled: the task has no
/// due time at all and the caller polls at its idle period instead. With
/// only `timeout_on`, the task re-triggers at a fixed cadence regardless of
/// calendar. With `schedule_on`, the result is the earliest instant at or
/// after `now` whose weekday is eligible at exactly `time_of_day`; when both
/// modes are enabled the schedule provides the first anchor and
/// [`next_interval`] takes over pacing after each completed run.
pub fn compute_next_run(
    trigger: &TriggerConfig,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, AutomatorError> {
    if trigger.is_idle() {
        return Ok(None);
    }

    if !trigger.schedule_on {
        return Ok(Some(next_interval(trigger, now)));
    }

    if trigger.days_of_week.is_empty() {
        // Rejected here as well as at validation: searching an empty day set
        // would never terminate.
        return Err(AutomatorError::Configuration(
            "schedule_on is set but days_of_week is empty".to_string(),
        ));
    }

    // A non-empty day set always matches within the scan: offset 7 covers a
    // same-weekday slot that already passed today.
    for offset in 0..=7 {
        let Some(date) = now.date().checked_add_days(Days::new(offset)) else {
            break;
        };
        if !trigger.days_of_week.contains(&date.weekday()) {
            continue;
        }
        let candidate = date.and_time(trigger.time_of_day);
        if candidate >= now {
            return Ok(Some(candidate));
        }
    }

    // Only reachable when the calendar overflows at the far end of the
    // supported date range.
    Ok(None)
}

/// Interval-mode anchor: `now + timeout_interval`. Absurdly large intervals
/// saturate instead of overflowing, pushing the run past any realistic
/// horizon.
pub fn next_interval(trigger: &TriggerConfig, now: NaiveDateTime) -> NaiveDateTime {
    chrono::Duration::from_std(trigger.timeout_interval)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(NaiveDateTime::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use std::time::Duration;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn at(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_idle_trigger_has_no_due_time() {
        let trigger = TriggerConfig::from_spec(serde_json::from_str("{}").unwrap()).unwrap();
        // 2024-07-01 is a Monday.
        let next = compute_next_run(&trigger, dt(2024, 7, 1, 8, 0)).unwrap();
        assert_eq!(next, None);
    }

    #[test]
    fn test_interval_mode_ignores_calendar() {
        let trigger = TriggerConfig::interval(Duration::from_secs(900));
        let now = dt(2024, 7, 1, 8, 0);
        let next = compute_next_run(&trigger, now).unwrap().unwrap();
        assert_eq!(next, dt(2024, 7, 1, 8, 15));
    }

    #[test]
    fn test_interval_anchors_are_exactly_one_interval_apart() {
        let trigger = TriggerConfig::interval(Duration::from_secs(5));
        let mut now = dt(2024, 7, 1, 8, 0);
        for _ in 0..10 {
            let next = compute_next_run(&trigger, now).unwrap().unwrap();
            assert_eq!(next - now, chrono::Duration::seconds(5));
            now = next;
        }
    }

    #[test]
    fn test_schedule_later_today() {
        let trigger = TriggerConfig::weekly(vec![Weekday::Mon], at(9, 0));
        let next = compute_next_run(&trigger, dt(2024, 7, 1, 8, 59)).unwrap().unwrap();
        assert_eq!(next, dt(2024, 7, 1, 9, 0));
    }

    #[test]
    fn test_slot_equal_to_now_is_due_today() {
        let trigger = TriggerConfig::weekly(vec![Weekday::Mon], at(9, 0));
        let now = dt(2024, 7, 1, 9, 0);
        assert_eq!(compute_next_run(&trigger, now).unwrap(), Some(now));
    }

    #[test]
    fn test_passed_slot_wraps_to_next_week() {
        // Monday 09:01 with only Monday eligible rolls a full week forward.
        let trigger = TriggerConfig::weekly(vec![Weekday::Mon], at(9, 0));
        let next = compute_next_run(&trigger, dt(2024, 7, 1, 9, 1)).unwrap().unwrap();
        assert_eq!(next, dt(2024, 7, 8, 9, 0));
    }

    #[test]
    fn test_earliest_eligible_day_wins() {
        // From Tuesday, with Monday+Friday eligible, Friday comes first.
        let trigger = TriggerConfig::weekly(vec![Weekday::Mon, Weekday::Fri], at(7, 30));
        let next = compute_next_run(&trigger, dt(2024, 7, 2, 12, 0)).unwrap().unwrap();
        assert_eq!(next, dt(2024, 7, 5, 7, 30));
        assert_eq!(next.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_result_is_never_in_the_past() {
        let trigger = TriggerConfig::weekly(
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            at(12, 44),
        );
        let mut now = dt(2024, 7, 1, 0, 0);
        for _ in 0..30 {
            let next = compute_next_run(&trigger, now).unwrap().unwrap();
            assert!(next >= now);
            assert!(trigger.days_of_week.contains(&next.weekday()));
            assert_eq!(next.time(), at(12, 44));
            now += chrono::Duration::hours(11);
        }
    }

    #[test]
    fn test_idempotent_for_fixed_inputs() {
        let trigger = TriggerConfig::weekly(vec![Weekday::Sun], at(23, 15));
        let now = dt(2024, 7, 3, 4, 5);
        let first = compute_next_run(&trigger, now).unwrap();
        let second = compute_next_run(&trigger, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_days_with_schedule_on_errors() {
        let trigger = TriggerConfig {
            schedule_on: true,
            days_of_week: Vec::new(),
            time_of_day: at(9, 0),
            timeout_on: false,
            timeout_interval: Duration::ZERO,
        };
        let err = compute_next_run(&trigger, dt(2024, 7, 1, 8, 0)).unwrap_err();
        assert!(matches!(err, AutomatorError::Configuration(_)));
    }

    #[test]
    fn test_both_modes_schedule_drives_first_anchor() {
        let trigger = TriggerConfig {
            schedule_on: true,
            days_of_week: vec![Weekday::Tue],
            time_of_day: at(6, 0),
            timeout_on: true,
            timeout_interval: Duration::from_secs(60),
        };
        let next = compute_next_run(&trigger, dt(2024, 7, 1, 8, 0)).unwrap().unwrap();
        assert_eq!(next, dt(2024, 7, 2, 6, 0));
    }

    #[test]
    fn test_absurd_interval_saturates() {
        let trigger = TriggerConfig::interval(Duration::from_secs(u64::MAX));
        let next = compute_next_run(&trigger, dt(2024, 7, 1, 8, 0)).unwrap().unwrap();
        assert_eq!(next, NaiveDateTime::MAX);
    }
}
