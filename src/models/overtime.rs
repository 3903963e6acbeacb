//! Overtime models.
//!
//! An [`OvertimeEntry`] is one contiguous run of overtime with a single
//! type and multiplier, produced by the overtime classifier from an
//! [`OvertimeSource`].

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::AuditStep;
use crate::workflow::{Approval, ApprovalStatus};

/// The pay classification of an overtime run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OvertimeKind {
    /// Daytime overtime on an ordinary day.
    #[serde(rename = "DIURNA")]
    Day,
    /// Night-window overtime on an ordinary day.
    #[serde(rename = "NOCTURNA")]
    Night,
    /// Overtime on a Sunday that is not a holiday.
    #[serde(rename = "DOMINICAL")]
    Sunday,
    /// Overtime on a holiday.
    #[serde(rename = "FESTIVA")]
    Holiday,
}

impl std::fmt::Display for OvertimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OvertimeKind::Day => write!(f, "DIURNA"),
            OvertimeKind::Night => write!(f, "NOCTURNA"),
            OvertimeKind::Sunday => write!(f, "DOMINICAL"),
            OvertimeKind::Holiday => write!(f, "FESTIVA"),
        }
    }
}

/// What an overtime classification was derived from.
///
/// The [`key`](OvertimeSource::key) is stable: classifying the same source
/// twice yields the same entry ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OvertimeSource {
    /// A matched entry/exit pair in the attendance log.
    AttendancePair {
        /// The entry event id.
        entry_event_id: String,
        /// The exit event id.
        exit_event_id: String,
    },
    /// A manually entered interval.
    Manual {
        /// Client-supplied id of the manual entry.
        manual_entry_id: String,
    },
}

impl OvertimeSource {
    /// Stable identifier of the source for `employee_id`.
    ///
    /// Manual ids are chosen by the client, so they are scoped to the
    /// employee. Attendance events already belong to exactly one employee.
    ///
    /// # Example
    ///
    /// ```
    /// use time_ledger::models::OvertimeSource;
    ///
    /// let source = OvertimeSource::Manual { manual_entry_id: "m-17".to_string() };
    /// assert_eq!(source.key("emp_001"), "manual:emp_001:m-17");
    /// ```
    pub fn key(&self, employee_id: &str) -> String {
        match self {
            OvertimeSource::AttendancePair {
                entry_event_id,
                exit_event_id,
            } => format!("attendance:{}:{}", entry_event_id, exit_event_id),
            OvertimeSource::Manual { manual_entry_id } => {
                format!("manual:{}:{}", employee_id, manual_entry_id)
            }
        }
    }

    /// Manual intervals are taken as-is; attendance intervals are trimmed by
    /// the resolved schedule.
    pub fn is_manual(&self) -> bool {
        matches!(self, OvertimeSource::Manual { .. })
    }
}

/// One contiguous run of overtime awaiting or past approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    /// Deterministic id: `{source_key}.{run_index}`.
    pub id: String,
    /// Key of the [`OvertimeSource`] this entry came from.
    pub source_key: String,
    /// The employee who worked the overtime.
    pub employee_id: String,
    /// Calendar date of the run start.
    pub date: NaiveDate,
    /// Run start.
    pub start_time: NaiveDateTime,
    /// Run end.
    pub end_time: NaiveDateTime,
    /// Worked minutes, rounded to the nearest minute.
    pub minutes: i64,
    /// `minutes / 60`.
    pub computed_hours: Decimal,
    /// The run classification.
    #[serde(rename = "type")]
    pub kind: OvertimeKind,
    /// Pay multiplier for the run.
    pub multiplier: Decimal,
    /// `computed_hours * multiplier`.
    pub equivalent_hours: Decimal,
    /// Why the overtime was worked.
    #[serde(default)]
    pub reason: String,
    /// Approval state.
    #[serde(flatten)]
    pub approval: Approval,
}

impl OvertimeEntry {
    /// Current approval status.
    pub fn status(&self) -> ApprovalStatus {
        self.approval.status
    }

    /// Hour-bank minutes credited when the entry is approved:
    /// `round(equivalent_hours * 60)`, half away from zero.
    ///
    /// Computed from whole minutes so no precision is lost in the hour
    /// fraction.
    pub fn bank_minutes(&self) -> i64 {
        let minutes = (Decimal::from(self.minutes) * self.multiplier)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        minutes.to_i64().unwrap_or(i64::MAX)
    }
}

/// The entries produced (or found) for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// Key of the classified source.
    pub source_key: String,
    /// Entries, in chronological order.
    pub entries: Vec<OvertimeEntry>,
    /// False when the entries already existed from an earlier run.
    pub created: bool,
    /// Sum of `equivalent_hours`.
    pub total_equivalent_hours: Decimal,
    /// `total_equivalent_hours` valued at the employee's hourly rate.
    pub estimated_pay: Decimal,
    /// One step per classified segment. Empty when `created` is false.
    pub audit_steps: Vec<AuditStep>,
}
