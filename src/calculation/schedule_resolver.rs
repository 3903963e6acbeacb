//! Schedule resolution.
//!
//! The resolver is a pure function: callers load the global
//! [`ScheduleConfig`] and the employee's special schedules and pass them in.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{ResolvedSchedule, ScheduleConfig, ScheduleSource, SpecialSchedule};

/// Resolves the effective schedule for `employee_id` on `date`.
///
/// An active special schedule covering `date` wins; when several match, the
/// one with the latest `valid_from` is used. Tolerance and the justification
/// flag always come from the global configuration (zero and false when a
/// special schedule applies and no global configuration exists).
///
/// # Errors
///
/// `ConfigurationMissing` when no special schedule applies and `config` is
/// `None`.
///
/// # Example
///
/// ```
/// use time_ledger::calculation::resolve_schedule;
/// use time_ledger::models::{ScheduleConfig, ScheduleSource};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let config = ScheduleConfig {
///     entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     exit_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     tolerance_minutes: 10,
///     requires_justification: false,
/// };
/// let date = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
///
/// let resolved = resolve_schedule(Some(&config), &[], "emp_001", date).unwrap();
/// assert_eq!(resolved.source, ScheduleSource::Global);
/// assert_eq!(resolved.tolerance_minutes, 10);
/// ```
pub fn resolve_schedule(
    config: Option<&ScheduleConfig>,
    specials: &[SpecialSchedule],
    employee_id: &str,
    date: NaiveDate,
) -> EngineResult<ResolvedSchedule> {
    let tolerance_minutes = config.map_or(0, |c| c.tolerance_minutes);
    let requires_justification = config.is_some_and(|c| c.requires_justification);

    let special = specials
        .iter()
        .filter(|s| s.employee_id == employee_id && s.applies_on(date))
        .max_by_key(|s| s.valid_from);

    if let Some(special) = special {
        return Ok(ResolvedSchedule {
            date,
            entry_time: special.entry_time,
            exit_time: special.exit_time,
            tolerance_minutes,
            requires_justification,
            source: ScheduleSource::Special {
                special_schedule_id: special.id.clone(),
            },
        });
    }

    let config = config.ok_or_else(|| EngineError::ConfigurationMissing {
        message: format!(
            "no global schedule to resolve employee '{}' on {}",
            employee_id, date
        ),
    })?;

    Ok(ResolvedSchedule {
        date,
        entry_time: config.entry_time,
        exit_time: config.exit_time,
        tolerance_minutes,
        requires_justification,
        source: ScheduleSource::Global,
    })
}
