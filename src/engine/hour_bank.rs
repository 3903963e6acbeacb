//! Hour-bank ledger operations.
//!
//! Entries are immutable. Every append writes the entry and the employee's
//! materialized counter in one batch guarded by the counter version, so the
//! counter always equals the signed sum of the entries it has seen.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::Engine;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EntryKind, HourBankBalance, HourBankCounter, HourBankEntry, OriginType, Reconciliation,
    signed_total,
};
use crate::store::{Document, WriteBatch};

/// Input for [`Engine::append_hour_bank_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHourBankEntry {
    /// The employee.
    pub employee_id: String,
    /// Business date the entry refers to.
    pub date: NaiveDate,
    /// Credit or debit.
    pub kind: EntryKind,
    /// What produced the entry.
    pub origin_type: OriginType,
    /// Id of the originating record.
    #[serde(default)]
    pub origin_ref: Option<String>,
    /// Unsigned amount, greater than zero.
    pub minutes: i64,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl Engine {
    /// Appends a ledger entry and updates the counter, retrying on conflict.
    ///
    /// # Errors
    ///
    /// `ValidationError` when `minutes <= 0`, `NotFound` for unknown
    /// employees, `ConcurrencyConflict` when every attempt lost a race.
    pub fn append_hour_bank_entry(&self, input: NewHourBankEntry) -> EngineResult<HourBankEntry> {
        validate_minutes(input.minutes)?;
        self.employee(&input.employee_id)?;
        self.with_retry("append_hour_bank_entry", || self.append_once(&input, None))
            .map(|(entry, _)| entry)
    }

    /// Debits a day off against the bank.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` when the balance is below `minutes`.
    pub fn take_compensatory_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
        minutes: i64,
        approver_id: &str,
    ) -> EngineResult<HourBankEntry> {
        validate_minutes(minutes)?;
        if approver_id.trim().is_empty() {
            return Err(EngineError::validation("approver_id", "must not be empty"));
        }
        self.active_employee(employee_id)?;

        let input = NewHourBankEntry {
            employee_id: employee_id.to_string(),
            date,
            kind: EntryKind::Debit,
            origin_type: OriginType::CompensatoryDay,
            origin_ref: None,
            minutes,
            notes: format!("compensatory day approved by {}", approver_id.trim()),
        };
        let (entry, counter) = self.with_retry("take_compensatory_day", || {
            self.append_once(&input, Some(minutes))
        })?;

        info!(
            employee_id = %employee_id,
            date = %date,
            minutes,
            balance_minutes = counter.balance_minutes,
            "Compensatory day taken"
        );
        Ok(entry)
    }

    /// The signed balance, served from the materialized counter.
    pub fn get_balance(&self, employee_id: &str) -> EngineResult<HourBankBalance> {
        let (_, counter) = self.current_counter(employee_id)?;
        Ok(counter.into())
    }

    /// An employee's ledger history, oldest first.
    pub fn hour_bank_entries(&self, employee_id: &str) -> EngineResult<Vec<HourBankEntry>> {
        self.store.hour_bank_entries(employee_id)
    }

    /// Re-derives the balance from raw entries and compares it with the
    /// counter. Drift is reported and logged, never repaired silently.
    pub fn reconcile(&self, employee_id: &str) -> EngineResult<Reconciliation> {
        let entries = self.store.hour_bank_entries(employee_id)?;
        let (_, counter) = self.current_counter(employee_id)?;

        let derived_minutes = signed_total(&entries)?;
        let derived_entries = entries.len() as u64;
        let consistent =
            derived_minutes == counter.balance_minutes && derived_entries == counter.entry_count;

        let reconciliation = Reconciliation {
            employee_id: employee_id.to_string(),
            counter_minutes: counter.balance_minutes,
            derived_minutes,
            counter_entries: counter.entry_count,
            derived_entries,
            consistent,
        };

        if !consistent {
            warn!(
                employee_id = %employee_id,
                counter_minutes = reconciliation.counter_minutes,
                derived_minutes,
                counter_entries = reconciliation.counter_entries,
                derived_entries,
                "Hour-bank counter drift detected"
            );
        }
        Ok(reconciliation)
    }

    /// Reconciles every employee with ledger activity.
    pub fn reconcile_all(&self) -> EngineResult<Vec<Reconciliation>> {
        let reports = self
            .store
            .hour_bank_employees()?
            .iter()
            .map(|employee_id| self.reconcile(employee_id))
            .collect::<EngineResult<Vec<_>>>()?;

        let drifted = reports.iter().filter(|r| !r.consistent).count();
        info!(
            employees = reports.len(),
            drifted,
            "Hour-bank reconciliation finished"
        );
        Ok(reports)
    }

    /// The stored counter and its version, or an empty counter.
    pub(super) fn current_counter(
        &self,
        employee_id: &str,
    ) -> EngineResult<(Option<u64>, HourBankCounter)> {
        Ok(match self.store.hour_bank_counter(employee_id)? {
            Some(stored) => (Some(stored.version), stored.value),
            None => (
                None,
                HourBankCounter {
                    employee_id: employee_id.to_string(),
                    ..HourBankCounter::default()
                },
            ),
        })
    }

    /// One read-modify-write of entry plus counter. With `require_balance`
    /// set, fails unless the current balance covers it.
    fn append_once(
        &self,
        input: &NewHourBankEntry,
        require_balance: Option<i64>,
    ) -> EngineResult<(HourBankEntry, HourBankCounter)> {
        let (version, counter) = self.current_counter(&input.employee_id)?;

        if let Some(required) = require_balance {
            if counter.balance_minutes < required {
                return Err(EngineError::InsufficientBalance {
                    employee_id: input.employee_id.clone(),
                    requested: required,
                    available: counter.balance_minutes,
                });
            }
        }

        let entry = HourBankEntry {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id.clone(),
            date: input.date,
            kind: input.kind,
            origin_type: input.origin_type,
            origin_ref: input.origin_ref.clone(),
            minutes: input.minutes,
            notes: input.notes.clone(),
            recorded_at: Utc::now(),
        };
        let next = counter.apply(&entry)?;

        self.store.commit(
            WriteBatch::new()
                .insert(Document::HourBankEntry(entry.clone()))
                .put(Document::HourBankCounter(next.clone()), version),
        )?;

        info!(
            employee_id = %entry.employee_id,
            entry_id = %entry.id,
            kind = ?entry.kind,
            origin = ?entry.origin_type,
            minutes = entry.minutes,
            balance_minutes = next.balance_minutes,
            "Hour-bank entry appended"
        );
        Ok((entry, next))
    }
}

fn validate_minutes(minutes: i64) -> EngineResult<()> {
    if minutes <= 0 {
        return Err(EngineError::validation(
            "minutes",
            format!("must be greater than zero, got {}", minutes),
        ));
    }
    Ok(())
}
