//! Configuration types for the ledger engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{DEFAULT_HOLIDAY_MULTIPLIER, Employee, Holiday, ScheduleConfig};

/// Fixed multipliers for overtime on days that are not holidays.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OvertimeMultipliers {
    /// Daytime overtime on an ordinary day.
    pub diurna: Decimal,
    /// Night-window overtime on an ordinary day.
    pub nocturna: Decimal,
    /// Overtime on a Sunday.
    pub dominical: Decimal,
}

impl Default for OvertimeMultipliers {
    fn default() -> Self {
        Self {
            diurna: Decimal::new(15, 1),
            nocturna: Decimal::new(175, 2),
            dominical: Decimal::new(20, 1),
        }
    }
}

/// The night band of the day. `start` is later than `end`: the band wraps
/// around midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NightWindow {
    /// Start of the night band (21:00 by default).
    pub start: NaiveTime,
    /// End of the night band (06:00 by default).
    pub end: NaiveTime,
}

impl NightWindow {
    /// Returns true if the time of day falls inside the night band.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            time >= self.start && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Vacation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VacationPolicy {
    /// Days granted per year when no explicit entitlement has been set.
    pub annual_days: u32,
}

impl Default for VacationPolicy {
    fn default() -> Self {
        Self { annual_days: 15 }
    }
}

fn default_working_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

fn default_holiday_multiplier() -> Decimal {
    DEFAULT_HOLIDAY_MULTIPLIER
}

/// Policy configuration from policy.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerPolicy {
    /// Overtime multiplier table.
    #[serde(default)]
    pub multipliers: OvertimeMultipliers,
    /// Multiplier assigned to holidays created without one.
    #[serde(default = "default_holiday_multiplier")]
    pub default_holiday_multiplier: Decimal,
    /// The night band.
    #[serde(default)]
    pub night_window: NightWindow,
    /// Days on which the resolved schedule is ordinary time. On other days
    /// every worked minute is overtime.
    #[serde(default = "default_working_days")]
    pub working_days: Vec<Weekday>,
    /// Vacation settings.
    #[serde(default)]
    pub vacation: VacationPolicy,
    /// Global schedule created on first boot when the store has none.
    #[serde(default)]
    pub schedule: Option<ScheduleConfig>,
}

impl LedgerPolicy {
    /// Returns true if the weekday is an ordinary working day.
    pub fn is_working_day(&self, weekday: Weekday) -> bool {
        self.working_days.contains(&weekday)
    }
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            multipliers: OvertimeMultipliers::default(),
            default_holiday_multiplier: DEFAULT_HOLIDAY_MULTIPLIER,
            night_window: NightWindow::default(),
            working_days: default_working_days(),
            vacation: VacationPolicy::default(),
            schedule: None,
        }
    }
}

/// A holiday as written in holidays.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidaySeed {
    /// The date of the holiday.
    pub date: chrono::NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// Whether the holiday is irrenunciable.
    #[serde(default)]
    pub irrenunciable: bool,
    /// Multiplier; the policy default applies when omitted.
    #[serde(default)]
    pub multiplier: Option<Decimal>,
}

impl HolidaySeed {
    /// Converts the seed into a holiday, filling in `default_multiplier`.
    pub fn into_holiday(self, default_multiplier: Decimal) -> Holiday {
        Holiday {
            date: self.date,
            name: self.name,
            irrenunciable: self.irrenunciable,
            multiplier: self.multiplier.unwrap_or(default_multiplier),
        }
    }
}

/// Holidays configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidaysConfig {
    /// Seed holidays.
    #[serde(default)]
    pub holidays: Vec<HolidaySeed>,
}

/// Employees configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeesConfig {
    /// Seed employee directory.
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// The complete ledger configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    policy: LedgerPolicy,
    holidays: Vec<Holiday>,
    employees: Vec<Employee>,
}

impl LedgerConfig {
    /// Creates a new LedgerConfig from its component parts.
    pub fn new(policy: LedgerPolicy, holidays: Vec<Holiday>, employees: Vec<Employee>) -> Self {
        let mut sorted_holidays = holidays;
        sorted_holidays.sort_by(|a, b| a.date.cmp(&b.date));
        Self {
            policy,
            holidays: sorted_holidays,
            employees,
        }
    }

    /// Returns the policy.
    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    /// Returns the seed holidays, oldest first.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Returns the seed employee directory.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }
}
