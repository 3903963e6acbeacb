//! Schedule models.
//!
//! This module defines the global [`ScheduleConfig`], per-employee
//! [`SpecialSchedule`] overrides, and the [`ResolvedSchedule`] produced by the
//! schedule resolver for one employee on one date.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The global daily entry/exit window.
///
/// A single instance exists per deployment. It is created once and
/// updated in place by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Scheduled entry time.
    pub entry_time: NaiveTime,
    /// Scheduled exit time. Earlier than `entry_time` for windows crossing midnight.
    pub exit_time: NaiveTime,
    /// Grace period after `entry_time` before an entry counts as late.
    pub tolerance_minutes: u32,
    /// Whether late entries must carry a justification note.
    #[serde(default)]
    pub requires_justification: bool,
}

/// A per-employee schedule override valid over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSchedule {
    /// Unique identifier.
    pub id: String,
    /// The employee the override applies to.
    pub employee_id: String,
    /// Overridden entry time.
    pub entry_time: NaiveTime,
    /// Overridden exit time.
    pub exit_time: NaiveTime,
    /// First date the override applies (inclusive).
    pub valid_from: NaiveDate,
    /// Last date the override applies (inclusive). Open-ended when absent.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Only active overrides are considered by the resolver.
    pub active: bool,
}

impl SpecialSchedule {
    /// Returns true if the override is active and `date` is in its window.
    ///
    /// # Example
    ///
    /// ```
    /// use time_ledger::models::SpecialSchedule;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let special = SpecialSchedule {
    ///     id: "sp_1".to_string(),
    ///     employee_id: "emp_001".to_string(),
    ///     entry_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    ///     exit_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
    ///     valid_from: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
    ///     valid_to: Some(NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()),
    ///     notes: String::new(),
    ///     active: true,
    /// };
    /// assert!(special.applies_on(NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()));
    /// assert!(!special.applies_on(NaiveDate::from_ymd_opt(2025, 2, 16).unwrap()));
    /// ```
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.valid_from <= date
            && self.valid_to.is_none_or(|valid_to| date <= valid_to)
    }
}

/// Where a resolved schedule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleSource {
    /// The global [`ScheduleConfig`].
    Global,
    /// A [`SpecialSchedule`] override.
    Special {
        /// The id of the override.
        special_schedule_id: String,
    },
}

/// The effective schedule for one employee on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchedule {
    /// The date the schedule was resolved for.
    pub date: NaiveDate,
    /// Effective entry time.
    pub entry_time: NaiveTime,
    /// Effective exit time.
    pub exit_time: NaiveTime,
    /// Grace period in minutes.
    pub tolerance_minutes: u32,
    /// Whether late entries must be justified.
    pub requires_justification: bool,
    /// Origin of the schedule.
    pub source: ScheduleSource,
}

impl ResolvedSchedule {
    /// The scheduled entry instant.
    pub fn entry_at(&self) -> NaiveDateTime {
        self.date.and_time(self.entry_time)
    }

    /// The scheduled exit instant, on the next day when the window crosses midnight.
    pub fn exit_at(&self) -> NaiveDateTime {
        let exit = self.date.and_time(self.exit_time);
        if self.exit_time <= self.entry_time {
            exit + Duration::days(1)
        } else {
            exit
        }
    }

    /// The latest entry instant that is not late.
    pub fn late_after(&self) -> NaiveDateTime {
        self.entry_at() + Duration::minutes(i64::from(self.tolerance_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn resolved(entry: NaiveTime, exit: NaiveTime) -> ResolvedSchedule {
        ResolvedSchedule {
            date: make_date("2025-01-06"),
            entry_time: entry,
            exit_time: exit,
            tolerance_minutes: 10,
            requires_justification: false,
            source: ScheduleSource::Global,
        }
    }

    #[test]
    fn test_day_window_exit_same_day() {
        let schedule = resolved(time(9, 0), time(18, 0));
        assert_eq!(schedule.exit_at().date(), make_date("2025-01-06"));
        assert_eq!(schedule.late_after().time(), time(9, 10));
    }

    #[test]
    fn test_night_window_exit_next_day() {
        let schedule = resolved(time(22, 0), time(6, 0));
        assert_eq!(schedule.exit_at().date(), make_date("2025-01-07"));
        assert_eq!(schedule.exit_at().time(), time(6, 0));
    }

    #[test]
    fn test_inactive_special_never_applies() {
        let special = SpecialSchedule {
            id: "sp_1".to_string(),
            employee_id: "emp_001".to_string(),
            entry_time: time(10, 0),
            exit_time: time(19, 0),
            valid_from: make_date("2025-02-01"),
            valid_to: None,
            notes: String::new(),
            active: false,
        };
        assert!(!special.applies_on(make_date("2025-02-05")));
    }

    #[test]
    fn test_open_ended_special_applies_forever() {
        let special = SpecialSchedule {
            id: "sp_1".to_string(),
            employee_id: "emp_001".to_string(),
            entry_time: time(10, 0),
            exit_time: time(19, 0),
            valid_from: make_date("2025-02-01"),
            valid_to: None,
            notes: String::new(),
            active: true,
        };
        assert!(!special.applies_on(make_date("2025-01-31")));
        assert!(special.applies_on(make_date("2030-12-31")));
    }

    #[test]
    fn test_schedule_config_deserialization() {
        let json = r#"{
            "entry_time": "09:00:00",
            "exit_time": "18:00:00",
            "tolerance_minutes": 10
        }"#;
        let config: ScheduleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.entry_time, time(9, 0));
        assert!(!config.requires_justification);
    }
}
