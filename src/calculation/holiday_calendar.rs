//! Holiday calendar lookups.
//!
//! The calendar is an immutable snapshot of the holiday table. The engine
//! rebuilds it after every holiday write.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::models::{DateClassification, Holiday};

/// An in-memory snapshot of the holiday table keyed by date.
///
/// # Example
///
/// ```
/// use time_ledger::calculation::HolidayCalendar;
/// use time_ledger::models::Holiday;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let calendar = HolidayCalendar::new(vec![Holiday {
///     date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
///     name: "Día del Trabajo".to_string(),
///     irrenunciable: true,
///     multiplier: Decimal::new(175, 2),
/// }]);
///
/// let labour_day = calendar.classify_date(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
/// assert!(labour_day.is_holiday);
/// assert_eq!(labour_day.multiplier, Decimal::new(175, 2));
///
/// let ordinary = calendar.classify_date(NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
/// assert!(!ordinary.is_holiday);
/// assert_eq!(ordinary.multiplier, Decimal::ONE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, Holiday>,
}

impl HolidayCalendar {
    /// Builds a calendar. A later holiday with the same date replaces an earlier one.
    pub fn new(holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self {
            holidays: holidays.into_iter().map(|h| (h.date, h)).collect(),
        }
    }

    /// Returns the holiday on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.get(&date)
    }

    /// Returns true if `date` is a holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Holidays in `year`, in date order.
    pub fn in_year(&self, year: i32) -> impl Iterator<Item = &Holiday> {
        self.holidays.values().filter(move |h| h.date.year() == year)
    }

    /// All holidays in date order.
    pub fn iter(&self) -> impl Iterator<Item = &Holiday> {
        self.holidays.values()
    }

    /// Number of holidays in the snapshot.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Returns true if the snapshot holds no holidays.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// Classifies `date` for pay purposes.
    ///
    /// A holiday keeps its own multiplier even on a Sunday; the two are
    /// never stacked. Dates without a holiday record get a multiplier of 1.0.
    pub fn classify_date(&self, date: NaiveDate) -> DateClassification {
        let is_sunday = date.weekday() == Weekday::Sun;
        match self.holidays.get(&date) {
            Some(holiday) => DateClassification {
                date,
                is_holiday: true,
                is_sunday,
                multiplier: holiday.multiplier,
                holiday_name: Some(holiday.name.clone()),
                irrenunciable: holiday.irrenunciable,
            },
            None => DateClassification {
                date,
                is_holiday: false,
                is_sunday,
                multiplier: Decimal::ONE,
                holiday_name: None,
                irrenunciable: false,
            },
        }
    }
}
