//! Vacation request and balance models.
//!
//! [`VacationBalance`] keeps `total_days == used_days + pending_days +
//! available_days`. Every mutation goes through a method that returns a new
//! balance, so the invariant is checked in one place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::workflow::{Approval, ApprovalStatus};

/// A request for vacation days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationRequest {
    /// Unique identifier.
    pub id: String,
    /// The requesting employee.
    pub employee_id: String,
    /// The balance year the days are charged to (year of `start_date`).
    pub year: i32,
    /// First day off (inclusive).
    pub start_date: NaiveDate,
    /// Last day off (inclusive).
    pub end_date: NaiveDate,
    /// Business days in the range.
    pub requested_days: u32,
    /// Why the days are requested.
    #[serde(default)]
    pub reason: String,
    /// Approval state.
    #[serde(flatten)]
    pub approval: Approval,
}

impl VacationRequest {
    /// Current approval status.
    pub fn status(&self) -> ApprovalStatus {
        self.approval.status
    }
}

/// Vacation days for one employee and year.
///
/// # Example
///
/// ```
/// use time_ledger::models::VacationBalance;
///
/// let balance = VacationBalance::new("emp_001", 2025, 15);
/// let reserved = balance.reserve(5).unwrap();
/// assert_eq!(reserved.pending_days, 5);
/// assert_eq!(reserved.available_days, 10);
/// assert!(reserved.is_consistent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationBalance {
    /// The employee.
    pub employee_id: String,
    /// The balance year.
    pub year: i32,
    /// Entitlement for the year.
    pub total_days: u32,
    /// Days taken under approved requests.
    pub used_days: u32,
    /// Days reserved by pending requests.
    pub pending_days: u32,
    /// Days still free to request.
    pub available_days: u32,
}

impl VacationBalance {
    /// A fresh balance with nothing used or pending.
    pub fn new(employee_id: impl Into<String>, year: i32, total_days: u32) -> Self {
        Self {
            employee_id: employee_id.into(),
            year,
            total_days,
            used_days: 0,
            pending_days: 0,
            available_days: total_days,
        }
    }

    /// Returns true when the balance invariant holds.
    pub fn is_consistent(&self) -> bool {
        u64::from(self.used_days) + u64::from(self.pending_days) + u64::from(self.available_days)
            == u64::from(self.total_days)
    }

    /// Moves `days` from available to pending.
    pub fn reserve(&self, days: u32) -> EngineResult<VacationBalance> {
        if days > self.available_days {
            return Err(EngineError::InsufficientBalance {
                employee_id: self.employee_id.clone(),
                requested: i64::from(days),
                available: i64::from(self.available_days),
            });
        }
        Ok(VacationBalance {
            pending_days: self.pending_days + days,
            available_days: self.available_days - days,
            ..self.clone()
        })
    }

    /// Moves `days` from pending to used.
    pub fn commit(&self, days: u32) -> EngineResult<VacationBalance> {
        let pending_days = self.take_pending(days)?;
        Ok(VacationBalance {
            pending_days,
            used_days: self.used_days + days,
            ..self.clone()
        })
    }

    /// Moves `days` from pending back to available.
    pub fn release(&self, days: u32) -> EngineResult<VacationBalance> {
        let pending_days = self.take_pending(days)?;
        Ok(VacationBalance {
            pending_days,
            available_days: self.available_days + days,
            ..self.clone()
        })
    }

    /// Changes the entitlement, keeping used and pending days.
    pub fn with_total(&self, total_days: u32) -> EngineResult<VacationBalance> {
        let committed = self.used_days + self.pending_days;
        if total_days < committed {
            return Err(EngineError::validation(
                "total_days",
                format!(
                    "cannot be lower than used plus pending days ({})",
                    committed
                ),
            ));
        }
        Ok(VacationBalance {
            total_days,
            available_days: total_days - committed,
            ..self.clone()
        })
    }

    fn take_pending(&self, days: u32) -> EngineResult<u32> {
        self.pending_days
            .checked_sub(days)
            .ok_or_else(|| EngineError::validation(
                "pending_days",
                format!(
                    "{} days are not reserved for employee '{}' in {}",
                    days, self.employee_id, self.year
                ),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_then_commit() {
        let balance = VacationBalance::new("emp_001", 2025, 15)
            .reserve(5)
            .unwrap()
            .commit(5)
            .unwrap();
        assert_eq!(balance.used_days, 5);
        assert_eq!(balance.pending_days, 0);
        assert_eq!(balance.available_days, 10);
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_reserve_then_release_restores_available() {
        let reserved = VacationBalance::new("emp_001", 2025, 15).reserve(5).unwrap();
        let released = reserved.release(5).unwrap();
        assert_eq!(released.available_days, reserved.available_days + 5);
        assert_eq!(released.used_days, 0);
        assert!(released.is_consistent());
    }

    #[test]
    fn test_reserve_more_than_available_fails() {
        let result = VacationBalance::new("emp_001", 2025, 3).reserve(4);
        match result {
            Err(EngineError::InsufficientBalance {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("Expected InsufficientBalance, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_without_reservation_fails() {
        let result = VacationBalance::new("emp_001", 2025, 15).commit(1);
        assert!(matches!(result, Err(EngineError::ValidationError { .. })));
    }

    #[test]
    fn test_with_total_keeps_committed_days() {
        let balance = VacationBalance::new("emp_001", 2025, 15)
            .reserve(4)
            .unwrap()
            .with_total(20)
            .unwrap();
        assert_eq!(balance.available_days, 16);
        assert!(balance.is_consistent());

        assert!(balance.with_total(3).is_err());
    }
}
