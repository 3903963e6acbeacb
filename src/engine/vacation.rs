//! Vacation accounting.
//!
//! Days are reserved when a request is made (`pending`), committed on
//! approval (`used`) and released on rejection (`available`). The request
//! and its balance are always written in the same batch.

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::Engine;
use crate::calculation::count_business_days;
use crate::error::{EngineError, EngineResult};
use crate::models::{VacationBalance, VacationRequest};
use crate::store::{Document, WriteBatch};
use crate::workflow::{Approval, Decision};

/// Input for [`Engine::request_vacation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVacationRequest {
    /// The requesting employee.
    pub employee_id: String,
    /// First day off.
    pub start_date: NaiveDate,
    /// Last day off.
    pub end_date: NaiveDate,
    /// Why the days are requested.
    #[serde(default)]
    pub reason: String,
}

const ENTITY: &str = "vacation_request";

impl Engine {
    /// Files a request and reserves its business days.
    ///
    /// Days are charged to the year of `start_date`. Holidays inside the
    /// range are counted like any other weekday.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` when `end_date < start_date`, `ValidationError`
    /// when the range holds no business days, `InsufficientBalance` when the
    /// days exceed what is available.
    pub fn request_vacation(&self, input: NewVacationRequest) -> EngineResult<VacationRequest> {
        self.active_employee(&input.employee_id)?;
        if input.end_date < input.start_date {
            return Err(EngineError::InvalidInterval {
                start: input.start_date.and_time(NaiveTime::MIN),
                end: input.end_date.and_time(NaiveTime::MIN),
                message: "vacation ends before it starts".to_string(),
            });
        }

        let requested_days = count_business_days(input.start_date, input.end_date);
        if requested_days == 0 {
            return Err(EngineError::validation(
                "end_date",
                format!(
                    "{} to {} contains no business days",
                    input.start_date, input.end_date
                ),
            ));
        }

        let request = VacationRequest {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id,
            year: input.start_date.year(),
            start_date: input.start_date,
            end_date: input.end_date,
            requested_days,
            reason: input.reason,
            approval: Approval::pending(),
        };

        let balance = self.with_retry("request_vacation", || {
            let (version, balance) =
                self.current_vacation_balance(&request.employee_id, request.year)?;
            let reserved = balance.reserve(requested_days)?;
            self.store.commit(
                WriteBatch::new()
                    .insert(Document::VacationRequest(request.clone()))
                    .put(Document::VacationBalance(reserved.clone()), version),
            )?;
            Ok(reserved)
        })?;

        info!(
            employee_id = %request.employee_id,
            request_id = %request.id,
            requested_days,
            available_days = balance.available_days,
            "Vacation requested"
        );
        Ok(request)
    }

    /// Approves a pending request, moving its days from pending to used.
    pub fn approve_vacation(&self, id: &str, approver_id: &str) -> EngineResult<VacationRequest> {
        let decision = Decision::Approve {
            approver_id: approver_id.to_string(),
        };
        self.decide_vacation(id, &decision, VacationBalance::commit)
    }

    /// Rejects a pending request, returning its days to available.
    pub fn reject_vacation(
        &self,
        id: &str,
        approver_id: &str,
        reason: &str,
    ) -> EngineResult<VacationRequest> {
        let decision = Decision::Reject {
            approver_id: approver_id.to_string(),
            comment: reason.to_string(),
        };
        self.decide_vacation(id, &decision, VacationBalance::release)
    }

    /// The balance for a year, or a fresh one at the configured entitlement.
    pub fn get_vacation_balance(
        &self,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<VacationBalance> {
        Ok(self.current_vacation_balance(employee_id, year)?.1)
    }

    /// Sets the entitlement for a year, keeping used and pending days.
    ///
    /// # Errors
    ///
    /// `ValidationError` when `total_days` is below used plus pending.
    pub fn set_vacation_entitlement(
        &self,
        employee_id: &str,
        year: i32,
        total_days: u32,
    ) -> EngineResult<VacationBalance> {
        self.employee(employee_id)?;
        let balance = self.with_retry("set_vacation_entitlement", || {
            let (version, balance) = self.current_vacation_balance(employee_id, year)?;
            let updated = balance.with_total(total_days)?;
            self.store.commit(
                WriteBatch::new().put(Document::VacationBalance(updated.clone()), version),
            )?;
            Ok(updated)
        })?;

        info!(
            employee_id = %employee_id,
            year,
            total_days,
            available_days = balance.available_days,
            "Vacation entitlement set"
        );
        Ok(balance)
    }

    /// An employee's requests charged to `year`, ordered by start date.
    pub fn vacation_requests(
        &self,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<Vec<VacationRequest>> {
        self.store.vacation_requests(employee_id, year)
    }

    /// One request by id.
    pub fn vacation_request(&self, id: &str) -> EngineResult<VacationRequest> {
        self.store
            .vacation_request(id)?
            .map(|r| r.value)
            .ok_or_else(|| EngineError::not_found(ENTITY, id))
    }

    /// Applies a decision and moves the request's days with `settle`, in one
    /// write. Not retried.
    fn decide_vacation(
        &self,
        id: &str,
        decision: &Decision,
        settle: fn(&VacationBalance, u32) -> EngineResult<VacationBalance>,
    ) -> EngineResult<VacationRequest> {
        let stored = self
            .store
            .vacation_request(id)?
            .ok_or_else(|| EngineError::not_found(ENTITY, id))?;
        let approval = stored.value.approval.decide(ENTITY, id, decision, Utc::now())?;
        let read_version = stored.version;
        let request = VacationRequest {
            approval,
            ..stored.value
        };

        let balance = self
            .store
            .vacation_balance(&request.employee_id, request.year)?
            .ok_or_else(|| {
                EngineError::not_found(
                    "vacation_balance",
                    format!("{}/{}", request.employee_id, request.year),
                )
            })?;
        let settled = settle(&balance.value, request.requested_days)?;

        self.store.commit(
            WriteBatch::new()
                .put(Document::VacationRequest(request.clone()), Some(read_version))
                .put(Document::VacationBalance(settled.clone()), Some(balance.version)),
        )?;

        info!(
            employee_id = %request.employee_id,
            request_id = %request.id,
            status = %request.status(),
            days = request.requested_days,
            used_days = settled.used_days,
            available_days = settled.available_days,
            "Vacation request decided"
        );
        Ok(request)
    }

    fn current_vacation_balance(
        &self,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<(Option<u64>, VacationBalance)> {
        Ok(match self.store.vacation_balance(employee_id, year)? {
            Some(stored) => (Some(stored.version), stored.value),
            None => (
                None,
                VacationBalance::new(employee_id, year, self.policy.vacation.annual_days),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::workflow::ApprovalStatus;
    use proptest::prelude::*;

    fn request(start: &str, end: &str) -> NewVacationRequest {
        NewVacationRequest {
            employee_id: "emp_001".to_string(),
            start_date: make_date(start),
            end_date: make_date(end),
            reason: "family trip".to_string(),
        }
    }

    #[test]
    fn test_request_reserves_days() {
        let engine = engine();
        let created = engine.request_vacation(request("2025-03-03", "2025-03-07")).unwrap();
        assert_eq!(created.requested_days, 5);
        assert_eq!(created.status(), ApprovalStatus::Pending);

        let balance = engine.get_vacation_balance("emp_001", 2025).unwrap();
        assert_eq!(balance.total_days, 15);
        assert_eq!(balance.pending_days, 5);
        assert_eq!(balance.available_days, 10);
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_approve_moves_pending_to_used() {
        let engine = engine();
        let created = engine.request_vacation(request("2025-03-03", "2025-03-07")).unwrap();
        let approved = engine.approve_vacation(&created.id, "hr_01").unwrap();
        assert_eq!(approved.status(), ApprovalStatus::Approved);

        let balance = engine.get_vacation_balance("emp_001", 2025).unwrap();
        assert_eq!(balance.used_days, 5);
        assert_eq!(balance.pending_days, 0);
        assert_eq!(balance.available_days, 10);
    }

    #[test]
    fn test_reject_restores_available() {
        let engine = engine();
        let created = engine.request_vacation(request("2025-03-03", "2025-03-07")).unwrap();
        let rejected = engine
            .reject_vacation(&created.id, "hr_01", "peak season")
            .unwrap();
        assert_eq!(rejected.status(), ApprovalStatus::Rejected);

        let balance = engine.get_vacation_balance("emp_001", 2025).unwrap();
        assert_eq!(balance.available_days, 15);
        assert_eq!(balance.used_days, 0);
        assert_eq!(balance.pending_days, 0);

        assert!(matches!(
            engine.approve_vacation(&created.id, "hr_01"),
            Err(EngineError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_reject_requires_reason() {
        let engine = engine();
        let created = engine.request_vacation(request("2025-03-03", "2025-03-04")).unwrap();
        assert!(matches!(
            engine.reject_vacation(&created.id, "hr_01", ""),
            Err(EngineError::ValidationError { .. })
        ));
        assert_eq!(
            engine.vacation_request(&created.id).unwrap().status(),
            ApprovalStatus::Pending
        );
    }

    #[test]
    fn test_reversed_range_and_weekend_only() {
        let engine = engine();
        assert!(matches!(
            engine.request_vacation(request("2025-03-07", "2025-03-03")),
            Err(EngineError::InvalidInterval { .. })
        ));
        assert!(matches!(
            engine.request_vacation(request("2025-03-08", "2025-03-09")),
            Err(EngineError::ValidationError { .. })
        ));
        assert!(engine.vacation_requests("emp_001", 2025).unwrap().is_empty());
    }

    #[test]
    fn test_exceeding_available_days_fails_without_effect() {
        let engine = engine();
        // Four full weeks: 20 business days against 15
        let result = engine.request_vacation(request("2025-03-03", "2025-03-28"));
        match result {
            Err(EngineError::InsufficientBalance {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 20);
                assert_eq!(available, 15);
            }
            other => panic!("Expected InsufficientBalance, got {:?}", other),
        }
        let balance = engine.get_vacation_balance("emp_001", 2025).unwrap();
        assert_eq!(balance.available_days, 15);
        assert!(engine.vacation_requests("emp_001", 2025).unwrap().is_empty());
    }

    #[test]
    fn test_holidays_are_not_subtracted() {
        let engine = engine();
        // 2025-05-01 (Thursday) is a seeded holiday
        let created = engine.request_vacation(request("2025-04-28", "2025-05-02")).unwrap();
        assert_eq!(created.requested_days, 5);
    }

    #[test]
    fn test_entitlement_cannot_drop_below_committed() {
        let engine = engine();
        engine.request_vacation(request("2025-03-03", "2025-03-07")).unwrap();
        assert!(matches!(
            engine.set_vacation_entitlement("emp_001", 2025, 4),
            Err(EngineError::ValidationError { .. })
        ));

        let balance = engine.set_vacation_entitlement("emp_001", 2025, 20).unwrap();
        assert_eq!(balance.available_days, 15);
        assert!(balance.is_consistent());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_balance_invariant_holds(
            ops in proptest::collection::vec((0u8..3, 0i64..60, 0i64..6), 1..12)
        ) {
            let engine = engine();
            let base = make_date("2025-01-06");
            for (action, offset, span) in ops {
                let start = base + chrono::Duration::days(offset);
                let end = start + chrono::Duration::days(span);
                if let Ok(created) = engine.request_vacation(NewVacationRequest {
                    employee_id: "emp_001".to_string(),
                    start_date: start,
                    end_date: end,
                    reason: String::new(),
                }) {
                    match action {
                        0 => { engine.approve_vacation(&created.id, "hr_01").unwrap(); }
                        1 => { engine.reject_vacation(&created.id, "hr_01", "no").unwrap(); }
                        _ => {}
                    }
                }
                let balance = engine.get_vacation_balance("emp_001", 2025).unwrap();
                prop_assert!(balance.is_consistent());
                prop_assert_eq!(balance.total_days, 15);
            }
        }
    }
}
