//! Holiday calendar operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use super::Engine;
use crate::error::{EngineError, EngineResult};
use crate::models::{DateClassification, Holiday};
use crate::store::{Document, WriteBatch};

impl Engine {
    /// Classifies `date` against the current holiday snapshot.
    pub fn classify_date(&self, date: NaiveDate) -> EngineResult<DateClassification> {
        Ok(self.calendar()?.classify_date(date))
    }

    /// Creates or replaces the holiday on `holiday.date`.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty name or a multiplier that is not
    /// positive.
    pub fn upsert_holiday(&self, holiday: Holiday) -> EngineResult<Holiday> {
        if holiday.name.trim().is_empty() {
            return Err(EngineError::validation("name", "must not be empty"));
        }
        if holiday.multiplier <= Decimal::ZERO {
            return Err(EngineError::validation(
                "multiplier",
                format!("must be greater than zero, got {}", holiday.multiplier),
            ));
        }

        let replaced = self.store.holiday(holiday.date)?.is_some();
        self.store
            .commit(WriteBatch::new().upsert(Document::Holiday(holiday.clone())))?;
        self.invalidate_calendar();

        info!(
            date = %holiday.date,
            name = %holiday.name,
            multiplier = %holiday.multiplier,
            replaced,
            "Holiday saved"
        );
        Ok(holiday)
    }

    /// Holidays in date order, optionally limited to one year.
    pub fn list_holidays(&self, year: Option<i32>) -> EngineResult<Vec<Holiday>> {
        let calendar = self.calendar()?;
        Ok(match year {
            Some(year) => calendar.in_year(year).cloned().collect(),
            None => calendar.iter().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_sunday_holiday_from_seed_keeps_holiday_multiplier() {
        let engine = engine();
        // San Pedro y San Pablo 2025 falls on a Sunday
        let classification = engine.classify_date(make_date("2025-06-29")).unwrap();
        assert!(classification.is_holiday);
        assert!(classification.is_sunday);
        assert_eq!(classification.multiplier, dec("1.75"));
    }

    #[test]
    fn test_upsert_replaces_and_invalidates_snapshot() {
        let engine = engine();
        let date = make_date("2025-05-01");
        assert_eq!(engine.classify_date(date).unwrap().multiplier, dec("1.75"));

        engine
            .upsert_holiday(Holiday {
                date,
                name: "Día del Trabajo".to_string(),
                irrenunciable: true,
                multiplier: dec("2.0"),
            })
            .unwrap();

        assert_eq!(engine.classify_date(date).unwrap().multiplier, dec("2.0"));
        assert_eq!(engine.list_holidays(Some(2025)).unwrap().len(), 16);
    }

    #[test]
    fn test_new_holiday_is_visible_immediately() {
        let engine = engine();
        let date = make_date("2025-03-10");
        assert!(!engine.classify_date(date).unwrap().is_holiday);

        engine
            .upsert_holiday(Holiday {
                date,
                name: "Feriado regional".to_string(),
                irrenunciable: false,
                multiplier: dec("1.5"),
            })
            .unwrap();

        let classification = engine.classify_date(date).unwrap();
        assert!(classification.is_holiday);
        assert_eq!(classification.holiday_name.as_deref(), Some("Feriado regional"));
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        let engine = engine();
        let result = engine.upsert_holiday(Holiday {
            date: make_date("2025-03-10"),
            name: "Bad".to_string(),
            irrenunciable: false,
            multiplier: Decimal::ZERO,
        });
        match result {
            Err(EngineError::ValidationError { field, .. }) => assert_eq!(field, "multiplier"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_list_filters_by_year() {
        let engine = engine();
        assert!(engine.list_holidays(Some(2024)).unwrap().is_empty());
        assert_eq!(engine.list_holidays(None).unwrap().len(), 16);
    }
}
