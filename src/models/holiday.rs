//! Holiday models.
//!
//! This module contains the [`Holiday`] record and the [`DateClassification`]
//! returned by the holiday calendar.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Multiplier applied to holiday work when a record does not set one (175%).
pub const DEFAULT_HOLIDAY_MULTIPLIER: Decimal = Decimal::from_parts(175, 0, 0, false, 2);

fn default_multiplier() -> Decimal {
    DEFAULT_HOLIDAY_MULTIPLIER
}

/// A public holiday. Dates are unique.
///
/// # Example
///
/// ```
/// use time_ledger::models::Holiday;
/// use chrono::NaiveDate;
///
/// let json = r#"{"date": "2025-09-18", "name": "Fiestas Patrias", "irrenunciable": true}"#;
/// let holiday: Holiday = serde_json::from_str(json).unwrap();
/// assert_eq!(holiday.date, NaiveDate::from_ymd_opt(2025, 9, 18).unwrap());
/// assert_eq!(holiday.multiplier.to_string(), "1.75");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// Irrenunciable holidays cannot be traded for another day off.
    #[serde(default)]
    pub irrenunciable: bool,
    /// Pay multiplier for work on this date.
    #[serde(default = "default_multiplier")]
    pub multiplier: Decimal,
}

/// The classification of a calendar date for pay purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateClassification {
    /// The classified date.
    pub date: NaiveDate,
    /// Whether a holiday record exists for the date.
    pub is_holiday: bool,
    /// Whether the date is a Sunday, independently of holidays.
    pub is_sunday: bool,
    /// The holiday multiplier, or 1.0 when the date is not a holiday.
    pub multiplier: Decimal,
    /// The holiday name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
    /// Whether the holiday is irrenunciable.
    pub irrenunciable: bool,
}
