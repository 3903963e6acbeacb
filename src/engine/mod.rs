//! The ledger engine.
//!
//! [`Engine`] owns the store, the employee directory and the policy, and
//! exposes every ledger operation. Each mutating operation reads what it
//! needs, computes the new documents with the pure functions in
//! [`crate::calculation`] and the models, and commits them as one
//! [`WriteBatch`](crate::store::WriteBatch).

mod attendance;
mod holidays;
mod hour_bank;
mod overtime;
mod schedule;
mod vacation;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::calculation::HolidayCalendar;
use crate::config::{LedgerConfig, LedgerPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::Employee;
use crate::store::{Document, EmployeeDirectory, LedgerStore, StaticDirectory, WriteBatch};

pub use attendance::NewAttendance;
pub use hour_bank::NewHourBankEntry;
pub use overtime::{MAX_OVERTIME_INTERVAL_DAYS, OvertimeApproval, OvertimeRequest};
pub use schedule::NewSpecialSchedule;
pub use vacation::NewVacationRequest;

/// Attempts made for writes that retry on `ConcurrencyConflict`.
pub const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// The Time & Pay Ledger Engine.
pub struct Engine {
    store: Arc<dyn LedgerStore>,
    directory: Arc<dyn EmployeeDirectory>,
    policy: LedgerPolicy,
    calendar: RwLock<Option<Arc<HolidayCalendar>>>,
}

impl Engine {
    /// Creates an engine over an existing store.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        directory: Arc<dyn EmployeeDirectory>,
        policy: LedgerPolicy,
    ) -> Self {
        Self {
            store,
            directory,
            policy,
            calendar: RwLock::new(None),
        }
    }

    /// Creates an engine from loaded configuration and seeds the store.
    ///
    /// Seeding only fills gaps: holidays already stored and an existing
    /// global schedule are left untouched.
    pub fn from_config(store: Arc<dyn LedgerStore>, config: &LedgerConfig) -> EngineResult<Self> {
        let directory = Arc::new(StaticDirectory::new(config.employees().to_vec()));
        let engine = Self::new(store, directory, config.policy().clone());
        engine.seed(config)?;
        Ok(engine)
    }

    fn seed(&self, config: &LedgerConfig) -> EngineResult<()> {
        let mut batch = WriteBatch::new();

        let mut seeded_holidays = 0;
        for holiday in config.holidays() {
            if self.store.holiday(holiday.date)?.is_none() {
                batch = batch.insert(Document::Holiday(holiday.clone()));
                seeded_holidays += 1;
            }
        }

        let mut seeded_schedule = false;
        if let Some(schedule) = &self.policy.schedule {
            if self.store.schedule_config()?.is_none() {
                batch = batch.insert(Document::ScheduleConfig(schedule.clone()));
                seeded_schedule = true;
            }
        }

        if !batch.is_empty() {
            self.store.commit(batch)?;
            self.invalidate_calendar();
        }

        info!(
            holidays = seeded_holidays,
            schedule = seeded_schedule,
            "Seeded ledger store from configuration"
        );
        Ok(())
    }

    /// The policy the engine runs with.
    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    /// The backing store.
    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// The current holiday snapshot, loaded from the store on first use
    /// after an invalidation.
    pub fn calendar(&self) -> EngineResult<Arc<HolidayCalendar>> {
        if let Some(calendar) = self.calendar.read().as_ref() {
            return Ok(Arc::clone(calendar));
        }

        let mut slot = self.calendar.write();
        if let Some(calendar) = slot.as_ref() {
            return Ok(Arc::clone(calendar));
        }
        let calendar = Arc::new(HolidayCalendar::new(self.store.holidays()?));
        *slot = Some(Arc::clone(&calendar));
        Ok(calendar)
    }

    fn invalidate_calendar(&self) {
        *self.calendar.write() = None;
    }

    /// Looks up an employee, failing if unknown.
    fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.directory
            .employee(employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    /// Looks up an employee that may receive new records.
    fn active_employee(&self, employee_id: &str) -> EngineResult<Employee> {
        let employee = self.employee(employee_id)?;
        if !employee.active {
            return Err(EngineError::validation(
                "employee_id",
                format!("employee '{}' is inactive", employee_id),
            ));
        }
        Ok(employee)
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error,
    /// or [`MAX_COMMIT_ATTEMPTS`] is reached. `attempt` must re-read
    /// everything it writes.
    fn with_retry<T>(
        &self,
        operation: &'static str,
        mut attempt: impl FnMut() -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut tries = 1;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && tries < MAX_COMMIT_ATTEMPTS => {
                    warn!(operation, attempt = tries, error = %err, "Write conflict, retrying");
                    tries += 1;
                }
                result => return result,
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
