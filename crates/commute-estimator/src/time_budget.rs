use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse `"HH:MM"` into minutes since midnight.
pub fn parse_hhmm(text: &str) -> Result<u32, EstimatorError> {
    let invalid = || EstimatorError::InvalidArrivalTime(text.to_string());

    let (hh, mm) = text.trim().split_once(':').ok_or_else(invalid)?;
    if hh.is_empty() || mm.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = hh.parse().map_err(|_| invalid())?;
    let minutes: u32 = mm.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Minutes from `now_minute` until `target_minute`, rolling into tomorrow
/// when the target is already past today.
pub fn time_budget_min(now_minute: u32, target_minute: u32) -> f64 {
    let mut target = target_minute;
    if target < now_minute {
        target += MINUTES_PER_DAY;
    }
    f64::from(target - now_minute)
}

/// Clock reading and target arrival resolved into an estimator budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBudget {
    pub current_hour: u32,
    pub now_minute: u32,
    pub target_minute: u32,
    pub time_budget_min: f64,
}

impl TimeBudget {
    pub fn from_clock<T: Timelike>(now: &T, arrive_hhmm: &str) -> Result<Self, EstimatorError> {
        let target_minute = parse_hhmm(arrive_hhmm)?;
        let now_minute = now.hour() * 60 + now.minute();
        Ok(Self {
            current_hour: now.hour(),
            now_minute,
            target_minute,
            time_budget_min: time_budget_min(now_minute, target_minute),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("08:30"), Ok(510));
        assert_eq!(parse_hhmm("0:05"), Ok(5));
        assert_eq!(parse_hhmm(" 23:59 "), Ok(1439));
    }

    #[test]
    fn test_parse_hhmm_rejects_malformed() {
        for bad in ["", "0830", "24:00", "12:60", "ab:cd", "12:5", ":30", "-1:30"] {
            assert!(parse_hhmm(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_budget_same_day() {
        assert_eq!(time_budget_min(8 * 60, 9 * 60 + 15), 75.0);
        assert_eq!(time_budget_min(600, 600), 0.0);
    }

    #[test]
    fn test_budget_rolls_to_next_day() {
        // 23:30 -> 00:15
        assert_eq!(time_budget_min(23 * 60 + 30, 15), 45.0);
    }

    #[test]
    fn test_from_clock() {
        let now = NaiveTime::from_hms_opt(7, 40, 12).unwrap();
        let budget = TimeBudget::from_clock(&now, "08:10").unwrap();
        assert_eq!(budget.current_hour, 7);
        assert_eq!(budget.now_minute, 460);
        assert_eq!(budget.target_minute, 490);
        assert_eq!(budget.time_budget_min, 30.0);
    }

    #[test]
    fn test_from_clock_invalid_time() {
        let now = NaiveTime::from_hms_opt(7, 40, 0).unwrap();
        assert_eq!(
            TimeBudget::from_clock(&now, "7h"),
            Err(EstimatorError::InvalidArrivalTime("7h".to_string()))
        );
    }
}
