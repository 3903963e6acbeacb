//! Core data models for the Time & Pay Ledger Engine.
//!
//! This module contains all the domain records persisted by the ledger
//! store and the value types returned by engine operations.

mod attendance;
mod audit;
mod employee;
mod holiday;
mod hour_bank;
mod overtime;
mod schedule;
mod vacation;

pub use attendance::{
    AttendanceEvent, AttendanceGap, AttendanceKind, AttendancePairing, GeoPoint,
    RecordedAttendance, WorkInterval,
};
pub use audit::AuditStep;
pub use employee::Employee;
pub use holiday::{DEFAULT_HOLIDAY_MULTIPLIER, DateClassification, Holiday};
pub use hour_bank::{
    EntryKind, HourBankBalance, HourBankCounter, HourBankEntry, OriginType, Reconciliation,
    signed_total,
};
pub use overtime::{ClassificationOutcome, OvertimeEntry, OvertimeKind, OvertimeSource};
pub use schedule::{ResolvedSchedule, ScheduleConfig, ScheduleSource, SpecialSchedule};
pub use vacation::{VacationBalance, VacationRequest};
