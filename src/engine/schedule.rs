//! Schedule operations.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::Engine;
use crate::calculation;
use crate::error::{EngineError, EngineResult};
use crate::models::{ResolvedSchedule, ScheduleConfig, SpecialSchedule};
use crate::store::{Document, Versioned, WriteBatch};

/// Input for [`Engine::assign_special_schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpecialSchedule {
    /// The employee the override applies to.
    pub employee_id: String,
    /// Overridden entry time.
    pub entry_time: NaiveTime,
    /// Overridden exit time.
    pub exit_time: NaiveTime,
    /// First date (inclusive).
    pub valid_from: NaiveDate,
    /// Last date (inclusive), open-ended when absent.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl Engine {
    /// Resolves the effective schedule for an employee on a date.
    ///
    /// The global configuration and the employee's special schedules are
    /// loaded on every call.
    pub fn resolve_schedule(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<ResolvedSchedule> {
        let config = self.store.schedule_config()?.map(|c| c.value);
        let specials: Vec<SpecialSchedule> = self
            .store
            .special_schedules(employee_id)?
            .into_iter()
            .map(|s| s.value)
            .collect();
        calculation::resolve_schedule(config.as_ref(), &specials, employee_id, date)
    }

    /// The global schedule with its version, if configured.
    pub fn schedule_config(&self) -> EngineResult<Option<Versioned<ScheduleConfig>>> {
        self.store.schedule_config()
    }

    /// Creates or replaces the global schedule.
    ///
    /// `expected_version` is the version the administrator edited; `None`
    /// means the caller expects no configuration to exist yet.
    ///
    /// # Errors
    ///
    /// `ValidationError` when entry and exit are equal, `ConcurrencyConflict`
    /// when `expected_version` is stale.
    pub fn update_schedule_config(
        &self,
        config: ScheduleConfig,
        expected_version: Option<u64>,
    ) -> EngineResult<Versioned<ScheduleConfig>> {
        validate_window(config.entry_time, config.exit_time)?;

        self.store.commit(
            WriteBatch::new().put(Document::ScheduleConfig(config.clone()), expected_version),
        )?;

        let version = expected_version.map_or(1, |v| v + 1);
        info!(
            entry_time = %config.entry_time,
            exit_time = %config.exit_time,
            tolerance_minutes = config.tolerance_minutes,
            version,
            "Global schedule updated"
        );
        Ok(Versioned {
            version,
            value: config,
        })
    }

    /// Assigns a special schedule, deactivating the employee's currently
    /// active ones in the same write.
    pub fn assign_special_schedule(
        &self,
        input: NewSpecialSchedule,
    ) -> EngineResult<SpecialSchedule> {
        self.active_employee(&input.employee_id)?;
        validate_window(input.entry_time, input.exit_time)?;
        if let Some(valid_to) = input.valid_to {
            if valid_to < input.valid_from {
                return Err(EngineError::validation(
                    "valid_to",
                    format!("{} is before valid_from {}", valid_to, input.valid_from),
                ));
            }
        }

        let special = SpecialSchedule {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id,
            entry_time: input.entry_time,
            exit_time: input.exit_time,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            notes: input.notes,
            active: true,
        };

        let mut batch = WriteBatch::new().insert(Document::SpecialSchedule(special.clone()));
        let mut deactivated = 0;
        for previous in self.store.special_schedules(&special.employee_id)? {
            if previous.value.active {
                let retired = SpecialSchedule {
                    active: false,
                    ..previous.value
                };
                batch = batch.put(Document::SpecialSchedule(retired), Some(previous.version));
                deactivated += 1;
            }
        }
        self.store.commit(batch)?;

        info!(
            employee_id = %special.employee_id,
            special_schedule_id = %special.id,
            valid_from = %special.valid_from,
            deactivated,
            "Special schedule assigned"
        );
        Ok(special)
    }

    /// All special schedules of an employee, ordered by `valid_from`.
    pub fn list_special_schedules(&self, employee_id: &str) -> EngineResult<Vec<SpecialSchedule>> {
        Ok(self
            .store
            .special_schedules(employee_id)?
            .into_iter()
            .map(|s| s.value)
            .collect())
    }
}

fn validate_window(entry_time: NaiveTime, exit_time: NaiveTime) -> EngineResult<()> {
    if entry_time == exit_time {
        return Err(EngineError::validation(
            "exit_time",
            "must differ from entry_time",
        ));
    }
    Ok(())
}
