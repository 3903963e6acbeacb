//! Overtime classification and approval.

use chrono::{Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::Engine;
use crate::calculation::{OvertimeRules, classify_interval};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceKind, AuditStep, ClassificationOutcome, Employee, EntryKind, HourBankBalance,
    HourBankEntry, OriginType, OvertimeEntry, OvertimeSource,
};
use crate::store::{Document, WriteBatch};
use crate::workflow::{Approval, Decision};

/// Input for [`Engine::classify_overtime`].
///
/// Attendance-pair sources take their interval from the two events; manual
/// sources must give `start` and `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRequest {
    /// The employee who worked.
    pub employee_id: String,
    /// What the interval comes from.
    pub source: OvertimeSource,
    /// Interval start.
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    /// Interval end.
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    /// Why the overtime was worked.
    #[serde(default)]
    pub reason: String,
}

/// Result of approving an overtime entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeApproval {
    /// The approved entry.
    pub entry: OvertimeEntry,
    /// The credit written to the hour bank. Absent only when the entry
    /// rounds to zero bank minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_bank_entry: Option<HourBankEntry>,
    /// The employee's balance after the credit.
    pub balance: HourBankBalance,
}

const ENTITY: &str = "overtime_entry";

/// Longest interval accepted for classification, in days.
pub const MAX_OVERTIME_INTERVAL_DAYS: i64 = 31;

impl Engine {
    /// Classifies a worked interval into pending overtime entries.
    ///
    /// Idempotent by source: when entries for the source already exist they
    /// are returned unchanged with `created == false`.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` for empty or reversed intervals and for intervals
    /// longer than [`MAX_OVERTIME_INTERVAL_DAYS`], `NotFound` for
    /// unknown attendance events, `ValidationError` for malformed sources,
    /// and `ConfigurationMissing` when an attendance interval has no
    /// schedule to trim against.
    pub fn classify_overtime(
        &self,
        request: OvertimeRequest,
    ) -> EngineResult<ClassificationOutcome> {
        let employee = self.active_employee(&request.employee_id)?;
        let (start, end) = self.overtime_interval(&request)?;
        if end <= start {
            return Err(EngineError::InvalidInterval {
                start,
                end,
                message: "overtime interval must have positive length".to_string(),
            });
        }
        if end - start > Duration::days(MAX_OVERTIME_INTERVAL_DAYS) {
            return Err(EngineError::InvalidInterval {
                start,
                end,
                message: format!(
                    "overtime interval must not exceed {} days",
                    MAX_OVERTIME_INTERVAL_DAYS
                ),
            });
        }

        let source_key = request.source.key(&employee.id);
        let existing = self.store.overtime_by_source(&source_key)?;
        if !existing.is_empty() {
            info!(
                employee_id = %employee.id,
                source_key = %source_key,
                entries = existing.len(),
                "Source already classified"
            );
            return Ok(outcome(source_key, existing, false, Vec::new(), &employee));
        }

        let schedule = if request.source.is_manual() {
            None
        } else {
            Some(self.resolve_schedule(&employee.id, start.date())?)
        };

        let calendar = self.calendar()?;
        let rules = OvertimeRules {
            policy: &self.policy,
            calendar: &calendar,
        };
        let classification = classify_interval(start, end, schedule.as_ref(), &rules)?;

        let entries: Vec<OvertimeEntry> = classification
            .runs
            .iter()
            .enumerate()
            .map(|(index, run)| OvertimeEntry {
                id: format!("{}.{}", source_key, index),
                source_key: source_key.clone(),
                employee_id: employee.id.clone(),
                date: run.date,
                start_time: run.start,
                end_time: run.end,
                minutes: run.minutes,
                computed_hours: run.computed_hours(),
                kind: run.kind,
                multiplier: run.multiplier,
                equivalent_hours: run.equivalent_hours(),
                reason: request.reason.clone(),
                approval: Approval::pending(),
            })
            .collect();

        if !entries.is_empty() {
            let batch = entries
                .iter()
                .cloned()
                .fold(WriteBatch::new(), |batch, e| batch.insert(Document::Overtime(e)));

            if let Err(err) = self.store.commit(batch) {
                // A concurrent classification of the same source won the race
                let stored = self.store.overtime_by_source(&source_key)?;
                if err.is_retryable() && !stored.is_empty() {
                    info!(source_key = %source_key, "Source classified concurrently");
                    return Ok(outcome(source_key, stored, false, Vec::new(), &employee));
                }
                return Err(err);
            }
        }

        let result = outcome(
            source_key,
            entries,
            true,
            classification.audit_steps,
            &employee,
        );
        info!(
            employee_id = %employee.id,
            source_key = %result.source_key,
            entries = result.entries.len(),
            equivalent_hours = %result.total_equivalent_hours,
            "Overtime classified"
        );
        Ok(result)
    }

    /// One overtime entry by id.
    pub fn overtime_entry(&self, id: &str) -> EngineResult<OvertimeEntry> {
        self.store
            .overtime_entry(id)?
            .map(|e| e.value)
            .ok_or_else(|| EngineError::not_found(ENTITY, id))
    }

    /// Approves a pending entry and credits the hour bank in the same write.
    ///
    /// Never retried: a concurrent decision makes this call fail with
    /// `ConcurrencyConflict`, and a later call sees the decided status and
    /// fails with `InvalidStateTransition`.
    pub fn approve_overtime(&self, id: &str, approver_id: &str) -> EngineResult<OvertimeApproval> {
        let stored = self
            .store
            .overtime_entry(id)?
            .ok_or_else(|| EngineError::not_found(ENTITY, id))?;
        let now = Utc::now();
        let decision = Decision::Approve {
            approver_id: approver_id.to_string(),
        };
        let approval = stored.value.approval.decide(ENTITY, id, &decision, now)?;
        let read_version = stored.version;
        let entry = OvertimeEntry {
            approval,
            ..stored.value
        };

        let (counter_version, counter) = self.current_counter(&entry.employee_id)?;
        let mut batch =
            WriteBatch::new().put(Document::Overtime(entry.clone()), Some(read_version));

        let minutes = entry.bank_minutes();
        let (credit, counter) = if minutes > 0 {
            let credit = HourBankEntry {
                id: Uuid::new_v4().to_string(),
                employee_id: entry.employee_id.clone(),
                date: entry.date,
                kind: EntryKind::Credit,
                origin_type: OriginType::Overtime,
                origin_ref: Some(entry.id.clone()),
                minutes,
                notes: format!("{} overtime approved by {}", entry.kind, approver_id.trim()),
                recorded_at: now,
            };
            let next = counter.apply(&credit)?;
            batch = batch
                .insert(Document::HourBankEntry(credit.clone()))
                .put(Document::HourBankCounter(next.clone()), counter_version);
            (Some(credit), next)
        } else {
            warn!(entry_id = %entry.id, "Approved overtime rounds to zero bank minutes");
            (None, counter)
        };

        self.store.commit(batch)?;

        info!(
            entry_id = %entry.id,
            employee_id = %entry.employee_id,
            approver_id = %approver_id.trim(),
            minutes,
            balance_minutes = counter.balance_minutes,
            "Overtime approved"
        );
        Ok(OvertimeApproval {
            entry,
            hour_bank_entry: credit,
            balance: counter.into(),
        })
    }

    /// Rejects a pending entry. No ledger effect.
    pub fn reject_overtime(
        &self,
        id: &str,
        approver_id: &str,
        comment: &str,
    ) -> EngineResult<OvertimeEntry> {
        let stored = self
            .store
            .overtime_entry(id)?
            .ok_or_else(|| EngineError::not_found(ENTITY, id))?;
        let decision = Decision::Reject {
            approver_id: approver_id.to_string(),
            comment: comment.to_string(),
        };
        let approval = stored.value.approval.decide(ENTITY, id, &decision, Utc::now())?;
        let read_version = stored.version;
        let entry = OvertimeEntry {
            approval,
            ..stored.value
        };

        self.store
            .commit(WriteBatch::new().put(Document::Overtime(entry.clone()), Some(read_version)))?;

        info!(
            entry_id = %entry.id,
            employee_id = %entry.employee_id,
            approver_id = %approver_id.trim(),
            "Overtime rejected"
        );
        Ok(entry)
    }

    fn overtime_interval(
        &self,
        request: &OvertimeRequest,
    ) -> EngineResult<(NaiveDateTime, NaiveDateTime)> {
        match &request.source {
            OvertimeSource::Manual { manual_entry_id } => {
                if manual_entry_id.trim().is_empty() {
                    return Err(EngineError::validation(
                        "source.manual_entry_id",
                        "must not be empty",
                    ));
                }
                let start = request.start.ok_or_else(|| {
                    EngineError::validation("start", "required for manual overtime")
                })?;
                let end = request
                    .end
                    .ok_or_else(|| EngineError::validation("end", "required for manual overtime"))?;
                Ok((start, end))
            }
            OvertimeSource::AttendancePair {
                entry_event_id,
                exit_event_id,
            } => {
                let entry = self.paired_event(entry_event_id, AttendanceKind::Entry, request)?;
                let exit = self.paired_event(exit_event_id, AttendanceKind::Exit, request)?;
                for (field, given, actual) in [
                    ("start", request.start, entry.timestamp),
                    ("end", request.end, exit.timestamp),
                ] {
                    if given.is_some_and(|g| g != actual) {
                        return Err(EngineError::validation(
                            field,
                            format!("does not match the attendance event at {}", actual),
                        ));
                    }
                }
                Ok((entry.timestamp, exit.timestamp))
            }
        }
    }

    fn paired_event(
        &self,
        event_id: &str,
        kind: AttendanceKind,
        request: &OvertimeRequest,
    ) -> EngineResult<crate::models::AttendanceEvent> {
        let event = self
            .store
            .attendance_event(event_id)?
            .ok_or_else(|| EngineError::not_found("attendance_event", event_id))?;
        if event.employee_id != request.employee_id {
            return Err(EngineError::validation(
                "source",
                format!("event '{}' belongs to another employee", event_id),
            ));
        }
        if event.kind != kind {
            return Err(EngineError::validation(
                "source",
                format!("event '{}' is not a {:?} event", event_id, kind),
            ));
        }
        Ok(event)
    }
}

fn outcome(
    source_key: String,
    entries: Vec<OvertimeEntry>,
    created: bool,
    audit_steps: Vec<AuditStep>,
    employee: &Employee,
) -> ClassificationOutcome {
    let total_equivalent_hours: Decimal = entries.iter().map(|e| e.equivalent_hours).sum();
    ClassificationOutcome {
        source_key,
        entries,
        created,
        total_equivalent_hours,
        estimated_pay: employee.value_of(total_equivalent_hours),
        audit_steps,
    }
}
