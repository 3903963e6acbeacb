//! Persistence seam for the ledger.
//!
//! The backing store is a document store without multi-document
//! transactions. Every mutating engine operation is expressed as one
//! [`WriteBatch`]: a list of documents, each guarded by a version
//! precondition. A store applies the whole batch or nothing, and fails with
//! `ConcurrencyConflict` when any precondition is stale.

mod directory;
mod memory;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::EngineResult;
use crate::models::{
    AttendanceEvent, Holiday, HourBankCounter, HourBankEntry, OvertimeEntry, ScheduleConfig,
    SpecialSchedule, VacationBalance, VacationRequest,
};

pub use directory::{EmployeeDirectory, StaticDirectory};
pub use memory::MemoryStore;

/// A stored document together with its version.
///
/// Versions start at 1 and increase by one on every write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Versioned<T> {
    /// Current version.
    pub version: u64,
    /// The document.
    pub value: T,
}

/// Every kind of document the ledger persists.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Document {
    ScheduleConfig(ScheduleConfig),
    SpecialSchedule(SpecialSchedule),
    Holiday(Holiday),
    Attendance(AttendanceEvent),
    Overtime(OvertimeEntry),
    HourBankEntry(HourBankEntry),
    HourBankCounter(HourBankCounter),
    VacationRequest(VacationRequest),
    VacationBalance(VacationBalance),
}

impl Document {
    /// The key the document is stored under.
    pub fn key(&self) -> DocumentKey {
        match self {
            Document::ScheduleConfig(_) => DocumentKey::ScheduleConfig,
            Document::SpecialSchedule(s) => DocumentKey::SpecialSchedule(s.id.clone()),
            Document::Holiday(h) => DocumentKey::Holiday(h.date),
            Document::Attendance(e) => DocumentKey::Attendance(e.id.clone()),
            Document::Overtime(e) => DocumentKey::Overtime(e.id.clone()),
            Document::HourBankEntry(e) => DocumentKey::HourBankEntry(e.id.clone()),
            Document::HourBankCounter(c) => DocumentKey::HourBankCounter(c.employee_id.clone()),
            Document::VacationRequest(r) => DocumentKey::VacationRequest(r.id.clone()),
            Document::VacationBalance(b) => {
                DocumentKey::VacationBalance(b.employee_id.clone(), b.year)
            }
        }
    }
}

/// Identity of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum DocumentKey {
    ScheduleConfig,
    SpecialSchedule(String),
    Holiday(NaiveDate),
    Attendance(String),
    Overtime(String),
    HourBankEntry(String),
    HourBankCounter(String),
    VacationRequest(String),
    VacationBalance(String, i32),
}

impl DocumentKey {
    /// Entity name used in error messages.
    pub fn entity(&self) -> &'static str {
        match self {
            DocumentKey::ScheduleConfig => "schedule_config",
            DocumentKey::SpecialSchedule(_) => "special_schedule",
            DocumentKey::Holiday(_) => "holiday",
            DocumentKey::Attendance(_) => "attendance_event",
            DocumentKey::Overtime(_) => "overtime_entry",
            DocumentKey::HourBankEntry(_) => "hour_bank_entry",
            DocumentKey::HourBankCounter(_) => "hour_bank_counter",
            DocumentKey::VacationRequest(_) => "vacation_request",
            DocumentKey::VacationBalance(..) => "vacation_balance",
        }
    }

    /// Document id used in error messages.
    pub fn id(&self) -> String {
        match self {
            DocumentKey::ScheduleConfig => "global".to_string(),
            DocumentKey::Holiday(date) => date.to_string(),
            DocumentKey::VacationBalance(employee_id, year) => format!("{}/{}", employee_id, year),
            DocumentKey::SpecialSchedule(id)
            | DocumentKey::Attendance(id)
            | DocumentKey::Overtime(id)
            | DocumentKey::HourBankEntry(id)
            | DocumentKey::HourBankCounter(id)
            | DocumentKey::VacationRequest(id) => id.clone(),
        }
    }
}

/// What must be true of the stored document for a write to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The document must not exist yet.
    Absent,
    /// The document must exist at exactly this version.
    Version(u64),
    /// No check; the write replaces whatever is stored.
    Any,
}

impl Precondition {
    /// `None` means insert-only, `Some(v)` means the stored version must be `v`.
    pub fn expecting(version: Option<u64>) -> Self {
        version.map_or(Precondition::Absent, Precondition::Version)
    }

    /// Returns true if a document at `current` satisfies the precondition.
    pub fn holds(self, current: Option<u64>) -> bool {
        match (self, current) {
            (Precondition::Any, _) => true,
            (Precondition::Absent, None) => true,
            (Precondition::Version(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// One guarded document write.
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    /// The new document.
    pub document: Document,
    /// The guard.
    pub precondition: Precondition,
}

/// A set of writes applied atomically.
///
/// # Example
///
/// ```
/// use time_ledger::models::HourBankCounter;
/// use time_ledger::store::{Document, LedgerStore, MemoryStore, WriteBatch};
///
/// let store = MemoryStore::new();
/// let counter = HourBankCounter {
///     employee_id: "emp_001".to_string(),
///     balance_minutes: 60,
///     entry_count: 1,
/// };
///
/// store.commit(WriteBatch::new().insert(Document::HourBankCounter(counter.clone()))).unwrap();
///
/// // A second insert of the same key fails and applies nothing
/// assert!(store.commit(WriteBatch::new().insert(Document::HourBankCounter(counter))).is_err());
/// assert_eq!(store.hour_bank_counter("emp_001").unwrap().unwrap().version, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an insert-only write.
    pub fn insert(self, document: Document) -> Self {
        self.with(document, Precondition::Absent)
    }

    /// Adds a write guarded by the version the caller read (`None` when the
    /// caller read nothing).
    pub fn put(self, document: Document, read_version: Option<u64>) -> Self {
        self.with(document, Precondition::expecting(read_version))
    }

    /// Adds an unguarded write.
    pub fn upsert(self, document: Document) -> Self {
        self.with(document, Precondition::Any)
    }

    /// Adds a write with an explicit precondition.
    pub fn with(mut self, document: Document, precondition: Precondition) -> Self {
        self.writes.push(Write {
            document,
            precondition,
        });
        self
    }

    /// Number of writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if the batch has no writes.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consumes the batch.
    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// The document store the engine runs against.
///
/// Reads return the latest committed state. `commit` is the only write path.
pub trait LedgerStore: Send + Sync {
    /// Applies every write in `batch`, or none of them.
    ///
    /// # Errors
    ///
    /// `ConcurrencyConflict` naming the first document whose precondition
    /// does not hold; `StoreUnavailable` on infrastructure faults.
    fn commit(&self, batch: WriteBatch) -> EngineResult<()>;

    /// The global schedule, if configured.
    fn schedule_config(&self) -> EngineResult<Option<Versioned<ScheduleConfig>>>;

    /// One special schedule by id.
    fn special_schedule(&self, id: &str) -> EngineResult<Option<Versioned<SpecialSchedule>>>;

    /// All special schedules of an employee, ordered by `valid_from`.
    fn special_schedules(&self, employee_id: &str)
    -> EngineResult<Vec<Versioned<SpecialSchedule>>>;

    /// One holiday by date.
    fn holiday(&self, date: NaiveDate) -> EngineResult<Option<Versioned<Holiday>>>;

    /// All holidays in date order.
    fn holidays(&self) -> EngineResult<Vec<Holiday>>;

    /// One attendance event by id.
    fn attendance_event(&self, id: &str) -> EngineResult<Option<AttendanceEvent>>;

    /// An employee's attendance events with `from <= date <= to`, ordered by
    /// timestamp.
    fn attendance_events(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceEvent>>;

    /// One overtime entry by id.
    fn overtime_entry(&self, id: &str) -> EngineResult<Option<Versioned<OvertimeEntry>>>;

    /// Overtime entries produced from one source, in run order.
    fn overtime_by_source(&self, source_key: &str) -> EngineResult<Vec<OvertimeEntry>>;

    /// An employee's hour-bank entries, ordered by `recorded_at`.
    fn hour_bank_entries(&self, employee_id: &str) -> EngineResult<Vec<HourBankEntry>>;

    /// The materialized balance of an employee.
    fn hour_bank_counter(&self, employee_id: &str)
    -> EngineResult<Option<Versioned<HourBankCounter>>>;

    /// Every employee with at least one hour-bank entry or a counter.
    fn hour_bank_employees(&self) -> EngineResult<Vec<String>>;

    /// One vacation request by id.
    fn vacation_request(&self, id: &str) -> EngineResult<Option<Versioned<VacationRequest>>>;

    /// An employee's requests charged to `year`, ordered by start date.
    fn vacation_requests(&self, employee_id: &str, year: i32)
    -> EngineResult<Vec<VacationRequest>>;

    /// The stored vacation balance of an employee for a year.
    fn vacation_balance(
        &self,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<Option<Versioned<VacationBalance>>>;
}
