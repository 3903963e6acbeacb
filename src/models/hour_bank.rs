//! Hour-bank ledger models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A credit in the employee's favor.
    #[serde(rename = "ABONO")]
    Credit,
    /// A debit against the employee.
    #[serde(rename = "DEUDA")]
    Debit,
}

impl EntryKind {
    /// Applies the sign of the kind to a positive amount of minutes.
    pub fn signed(self, minutes: i64) -> i64 {
        match self {
            EntryKind::Credit => minutes,
            EntryKind::Debit => -minutes,
        }
    }
}

/// What produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginType {
    /// An approved overtime entry.
    Overtime,
    /// A manual adjustment by an administrator.
    Manual,
    /// A day off taken against the bank.
    CompensatoryDay,
    /// A compensating entry correcting an earlier one.
    Correction,
}

/// An immutable ledger entry. `minutes` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBankEntry {
    /// Unique identifier.
    pub id: String,
    /// The employee the entry belongs to.
    pub employee_id: String,
    /// The business date the entry refers to.
    pub date: NaiveDate,
    /// Credit or debit.
    pub kind: EntryKind,
    /// What produced the entry.
    pub origin_type: OriginType,
    /// Id of the originating record (e.g. the overtime entry), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_ref: Option<String>,
    /// Unsigned amount.
    pub minutes: i64,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// When the entry was written.
    pub recorded_at: DateTime<Utc>,
}

impl HourBankEntry {
    /// The entry amount with its sign applied.
    pub fn signed_minutes(&self) -> i64 {
        self.kind.signed(self.minutes)
    }
}

/// Materialized running balance, written together with every append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBankCounter {
    /// The employee the counter belongs to.
    pub employee_id: String,
    /// Signed sum of all entries.
    pub balance_minutes: i64,
    /// Number of entries folded into the balance.
    pub entry_count: u64,
}

impl HourBankCounter {
    /// Returns the counter after folding in `entry`.
    ///
    /// # Errors
    ///
    /// `ValidationError` on `minutes` when the balance would leave the `i64`
    /// range.
    pub fn apply(&self, entry: &HourBankEntry) -> EngineResult<HourBankCounter> {
        let balance_minutes = self
            .balance_minutes
            .checked_add(entry.signed_minutes())
            .ok_or_else(|| balance_overflow(&entry.employee_id))?;
        Ok(HourBankCounter {
            employee_id: entry.employee_id.clone(),
            balance_minutes,
            entry_count: self.entry_count + 1,
        })
    }
}

/// Signed sum of `entries`, failing instead of wrapping.
pub fn signed_total(entries: &[HourBankEntry]) -> EngineResult<i64> {
    entries.iter().try_fold(0i64, |total, entry| {
        total
            .checked_add(entry.signed_minutes())
            .ok_or_else(|| balance_overflow(&entry.employee_id))
    })
}

fn balance_overflow(employee_id: &str) -> EngineError {
    EngineError::validation("minutes", format!("balance of '{}' would overflow", employee_id))
}

/// Balance as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBankBalance {
    /// The employee.
    pub employee_id: String,
    /// Signed balance in minutes.
    pub balance_minutes: i64,
    /// Number of ledger entries.
    pub entry_count: u64,
}

impl From<HourBankCounter> for HourBankBalance {
    fn from(counter: HourBankCounter) -> Self {
        Self {
            employee_id: counter.employee_id,
            balance_minutes: counter.balance_minutes,
            entry_count: counter.entry_count,
        }
    }
}

/// Result of re-deriving a counter from raw entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// The employee.
    pub employee_id: String,
    /// Balance held by the materialized counter.
    pub counter_minutes: i64,
    /// Balance re-derived from the entries.
    pub derived_minutes: i64,
    /// Entry count held by the counter.
    pub counter_entries: u64,
    /// Number of raw entries.
    pub derived_entries: u64,
    /// True when counter and entries agree.
    pub consistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(kind: EntryKind, minutes: i64) -> HourBankEntry {
        HourBankEntry {
            id: "hb_1".to_string(),
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            kind,
            origin_type: OriginType::Manual,
            origin_ref: None,
            minutes,
            notes: String::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_follows_kind() {
        assert_eq!(make_entry(EntryKind::Credit, 90).signed_minutes(), 90);
        assert_eq!(make_entry(EntryKind::Debit, 90).signed_minutes(), -90);
    }

    #[test]
    fn test_counter_apply_accumulates() {
        let counter = HourBankCounter::default()
            .apply(&make_entry(EntryKind::Credit, 120))
            .unwrap()
            .apply(&make_entry(EntryKind::Debit, 45))
            .unwrap();
        assert_eq!(counter.balance_minutes, 75);
        assert_eq!(counter.entry_count, 2);
        assert_eq!(counter.employee_id, "emp_001");
    }

    #[test]
    fn test_counter_apply_rejects_overflow() {
        let counter = HourBankCounter::default()
            .apply(&make_entry(EntryKind::Credit, i64::MAX))
            .unwrap();
        match counter.apply(&make_entry(EntryKind::Credit, 1)) {
            Err(EngineError::ValidationError { field, .. }) => assert_eq!(field, "minutes"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
        assert_eq!(counter.balance_minutes, i64::MAX);
    }

    #[test]
    fn test_signed_total_rejects_overflow() {
        let fits = [
            make_entry(EntryKind::Credit, i64::MAX),
            make_entry(EntryKind::Debit, 10),
        ];
        assert_eq!(signed_total(&fits).unwrap(), i64::MAX - 10);

        let overflows = [
            make_entry(EntryKind::Credit, i64::MAX),
            make_entry(EntryKind::Credit, 1),
        ];
        assert!(matches!(
            signed_total(&overflows),
            Err(EngineError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_origin_wire_names() {
        assert_eq!(
            serde_json::to_string(&OriginType::CompensatoryDay).unwrap(),
            "\"COMPENSATORY_DAY\""
        );
        assert_eq!(serde_json::to_string(&EntryKind::Credit).unwrap(), "\"ABONO\"");
    }
}
