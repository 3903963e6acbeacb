//! In-process [`LedgerStore`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::debug;

use super::{Document, DocumentKey, LedgerStore, Versioned, Write, WriteBatch};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceEvent, Holiday, HourBankCounter, HourBankEntry, OvertimeEntry, ScheduleConfig,
    SpecialSchedule, VacationBalance, VacationRequest,
};

#[derive(Debug, Default)]
struct Tables {
    schedule_config: Option<Versioned<ScheduleConfig>>,
    special_schedules: BTreeMap<String, Versioned<SpecialSchedule>>,
    holidays: BTreeMap<NaiveDate, Versioned<Holiday>>,
    attendance: BTreeMap<String, Versioned<AttendanceEvent>>,
    overtime: BTreeMap<String, Versioned<OvertimeEntry>>,
    hour_bank_entries: BTreeMap<String, Versioned<HourBankEntry>>,
    hour_bank_counters: BTreeMap<String, Versioned<HourBankCounter>>,
    vacation_requests: BTreeMap<String, Versioned<VacationRequest>>,
    vacation_balances: BTreeMap<(String, i32), Versioned<VacationBalance>>,
}

impl Tables {
    fn version_of(&self, key: &DocumentKey) -> Option<u64> {
        match key {
            DocumentKey::ScheduleConfig => self.schedule_config.as_ref().map(|d| d.version),
            DocumentKey::SpecialSchedule(id) => self.special_schedules.get(id).map(|d| d.version),
            DocumentKey::Holiday(date) => self.holidays.get(date).map(|d| d.version),
            DocumentKey::Attendance(id) => self.attendance.get(id).map(|d| d.version),
            DocumentKey::Overtime(id) => self.overtime.get(id).map(|d| d.version),
            DocumentKey::HourBankEntry(id) => self.hour_bank_entries.get(id).map(|d| d.version),
            DocumentKey::HourBankCounter(id) => {
                self.hour_bank_counters.get(id).map(|d| d.version)
            }
            DocumentKey::VacationRequest(id) => self.vacation_requests.get(id).map(|d| d.version),
            DocumentKey::VacationBalance(employee_id, year) => self
                .vacation_balances
                .get(&(employee_id.clone(), *year))
                .map(|d| d.version),
        }
    }

    fn apply(&mut self, document: Document, version: u64) {
        match document {
            Document::ScheduleConfig(value) => {
                self.schedule_config = Some(Versioned { version, value });
            }
            Document::SpecialSchedule(value) => {
                self.special_schedules
                    .insert(value.id.clone(), Versioned { version, value });
            }
            Document::Holiday(value) => {
                self.holidays.insert(value.date, Versioned { version, value });
            }
            Document::Attendance(value) => {
                self.attendance
                    .insert(value.id.clone(), Versioned { version, value });
            }
            Document::Overtime(value) => {
                self.overtime
                    .insert(value.id.clone(), Versioned { version, value });
            }
            Document::HourBankEntry(value) => {
                self.hour_bank_entries
                    .insert(value.id.clone(), Versioned { version, value });
            }
            Document::HourBankCounter(value) => {
                self.hour_bank_counters
                    .insert(value.employee_id.clone(), Versioned { version, value });
            }
            Document::VacationRequest(value) => {
                self.vacation_requests
                    .insert(value.id.clone(), Versioned { version, value });
            }
            Document::VacationBalance(value) => {
                self.vacation_balances.insert(
                    (value.employee_id.clone(), value.year),
                    Versioned { version, value },
                );
            }
        }
    }
}

/// A [`LedgerStore`] held entirely in memory.
///
/// All tables sit behind one lock, so a batch is validated and applied
/// without any reader observing a partial write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn commit(&self, batch: WriteBatch) -> EngineResult<()> {
        let writes: Vec<(DocumentKey, Write)> = batch
            .into_writes()
            .into_iter()
            .map(|w| (w.document.key(), w))
            .collect();

        let mut seen = HashSet::with_capacity(writes.len());
        for (key, _) in &writes {
            if !seen.insert(key) {
                return Err(EngineError::validation(
                    "batch",
                    format!("{} {} written twice in one batch", key.entity(), key.id()),
                ));
            }
        }

        let mut tables = self.tables.write();

        let mut versions = Vec::with_capacity(writes.len());
        for (key, write) in &writes {
            let current = tables.version_of(key);
            if !write.precondition.holds(current) {
                debug!(
                    entity = key.entity(),
                    id = %key.id(),
                    ?current,
                    expected = ?write.precondition,
                    "Write precondition failed"
                );
                return Err(EngineError::ConcurrencyConflict {
                    entity: key.entity().to_string(),
                    id: key.id(),
                });
            }
            versions.push(current.map_or(1, |v| v + 1));
        }

        for ((_, write), version) in writes.into_iter().zip(versions) {
            tables.apply(write.document, version);
        }

        Ok(())
    }

    fn schedule_config(&self) -> EngineResult<Option<Versioned<ScheduleConfig>>> {
        Ok(self.tables.read().schedule_config.clone())
    }

    fn special_schedule(&self, id: &str) -> EngineResult<Option<Versioned<SpecialSchedule>>> {
        Ok(self.tables.read().special_schedules.get(id).cloned())
    }

    fn special_schedules(
        &self,
        employee_id: &str,
    ) -> EngineResult<Vec<Versioned<SpecialSchedule>>> {
        let mut schedules: Vec<Versioned<SpecialSchedule>> = self
            .tables
            .read()
            .special_schedules
            .values()
            .filter(|s| s.value.employee_id == employee_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.value.valid_from);
        Ok(schedules)
    }

    fn holiday(&self, date: NaiveDate) -> EngineResult<Option<Versioned<Holiday>>> {
        Ok(self.tables.read().holidays.get(&date).cloned())
    }

    fn holidays(&self) -> EngineResult<Vec<Holiday>> {
        Ok(self
            .tables
            .read()
            .holidays
            .values()
            .map(|h| h.value.clone())
            .collect())
    }

    fn attendance_event(&self, id: &str) -> EngineResult<Option<AttendanceEvent>> {
        Ok(self.tables.read().attendance.get(id).map(|e| e.value.clone()))
    }

    fn attendance_events(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceEvent>> {
        let mut events: Vec<AttendanceEvent> = self
            .tables
            .read()
            .attendance
            .values()
            .map(|e| &e.value)
            .filter(|e| {
                let date = e.timestamp.date();
                e.employee_id == employee_id && from <= date && date <= to
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    fn overtime_entry(&self, id: &str) -> EngineResult<Option<Versioned<OvertimeEntry>>> {
        Ok(self.tables.read().overtime.get(id).cloned())
    }

    fn overtime_by_source(&self, source_key: &str) -> EngineResult<Vec<OvertimeEntry>> {
        let mut entries: Vec<OvertimeEntry> = self
            .tables
            .read()
            .overtime
            .values()
            .filter(|e| e.value.source_key == source_key)
            .map(|e| e.value.clone())
            .collect();
        entries.sort_by_key(|e| e.start_time);
        Ok(entries)
    }

    fn hour_bank_entries(&self, employee_id: &str) -> EngineResult<Vec<HourBankEntry>> {
        let mut entries: Vec<HourBankEntry> = self
            .tables
            .read()
            .hour_bank_entries
            .values()
            .filter(|e| e.value.employee_id == employee_id)
            .map(|e| e.value.clone())
            .collect();
        entries.sort_by_key(|e| e.recorded_at);
        Ok(entries)
    }

    fn hour_bank_counter(
        &self,
        employee_id: &str,
    ) -> EngineResult<Option<Versioned<HourBankCounter>>> {
        Ok(self.tables.read().hour_bank_counters.get(employee_id).cloned())
    }

    fn hour_bank_employees(&self) -> EngineResult<Vec<String>> {
        let tables = self.tables.read();
        let employees: BTreeSet<String> = tables
            .hour_bank_entries
            .values()
            .map(|e| e.value.employee_id.clone())
            .chain(tables.hour_bank_counters.keys().cloned())
            .collect();
        Ok(employees.into_iter().collect())
    }

    fn vacation_request(&self, id: &str) -> EngineResult<Option<Versioned<VacationRequest>>> {
        Ok(self.tables.read().vacation_requests.get(id).cloned())
    }

    fn vacation_requests(
        &self,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<Vec<VacationRequest>> {
        let mut requests: Vec<VacationRequest> = self
            .tables
            .read()
            .vacation_requests
            .values()
            .filter(|r| r.value.employee_id == employee_id && r.value.year == year)
            .map(|r| r.value.clone())
            .collect();
        requests.sort_by_key(|r| r.start_date);
        Ok(requests)
    }

    fn vacation_balance(
        &self,
        employee_id: &str,
        year: i32,
    ) -> EngineResult<Option<Versioned<VacationBalance>>> {
        Ok(self
            .tables
            .read()
            .vacation_balances
            .get(&(employee_id.to_string(), year))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn counter(balance_minutes: i64, entry_count: u64) -> Document {
        Document::HourBankCounter(HourBankCounter {
            employee_id: "emp_001".to_string(),
            balance_minutes,
            entry_count,
        })
    }

    fn holiday(date: &str) -> Document {
        Document::Holiday(Holiday {
            date: make_date(date),
            name: "Test".to_string(),
            irrenunciable: false,
            multiplier: Decimal::new(175, 2),
        })
    }

    #[test]
    fn test_versions_start_at_one_and_increase() {
        let store = MemoryStore::new();
        store.commit(WriteBatch::new().insert(counter(10, 1))).unwrap();
        store.commit(WriteBatch::new().put(counter(20, 2), Some(1))).unwrap();

        let stored = store.hour_bank_counter("emp_001").unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.value.balance_minutes, 20);
    }

    #[test]
    fn test_stale_version_rejects_whole_batch() {
        let store = MemoryStore::new();
        store.commit(WriteBatch::new().insert(counter(10, 1))).unwrap();

        let batch = WriteBatch::new()
            .insert(holiday("2025-05-01"))
            .put(counter(99, 2), Some(7));
        match store.commit(batch) {
            Err(EngineError::ConcurrencyConflict { entity, id }) => {
                assert_eq!(entity, "hour_bank_counter");
                assert_eq!(id, "emp_001");
            }
            other => panic!("Expected ConcurrencyConflict, got {:?}", other),
        }

        // Nothing from the failed batch is visible
        assert!(store.holiday(make_date("2025-05-01")).unwrap().is_none());
        assert_eq!(
            store.hour_bank_counter("emp_001").unwrap().unwrap().value.balance_minutes,
            10
        );
    }

    #[test]
    fn test_duplicate_key_in_batch_is_rejected() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .insert(holiday("2025-05-01"))
            .upsert(holiday("2025-05-01"));
        assert!(matches!(
            store.commit(batch),
            Err(EngineError::ValidationError { .. })
        ));
        assert!(store.holidays().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_ignores_version() {
        let store = MemoryStore::new();
        store.commit(WriteBatch::new().upsert(holiday("2025-05-01"))).unwrap();
        store.commit(WriteBatch::new().upsert(holiday("2025-05-01"))).unwrap();
        assert_eq!(store.holiday(make_date("2025-05-01")).unwrap().unwrap().version, 2);
    }

    #[test]
    fn test_hour_bank_employees_are_distinct_and_sorted() {
        let store = MemoryStore::new();
        let entry = |id: &str, employee_id: &str| {
            Document::HourBankEntry(HourBankEntry {
                id: id.to_string(),
                employee_id: employee_id.to_string(),
                date: make_date("2025-01-06"),
                kind: crate::models::EntryKind::Credit,
                origin_type: crate::models::OriginType::Manual,
                origin_ref: None,
                minutes: 30,
                notes: String::new(),
                recorded_at: Utc::now(),
            })
        };
        store
            .commit(
                WriteBatch::new()
                    .insert(entry("hb_2", "emp_002"))
                    .insert(entry("hb_1", "emp_001"))
                    .insert(entry("hb_3", "emp_002")),
            )
            .unwrap();
        assert_eq!(
            store.hour_bank_employees().unwrap(),
            vec!["emp_001".to_string(), "emp_002".to_string()]
        );
    }
}
