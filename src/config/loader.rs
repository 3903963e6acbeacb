//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading ledger
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EmployeesConfig, HolidaysConfig, LedgerConfig, LedgerPolicy};

/// Loads and provides access to ledger configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── policy.yaml     # Multipliers, night window, working days, vacation, seed schedule
/// ├── holidays.yaml   # Seed holiday calendar
/// └── employees.yaml  # Optional seed employee directory
/// ```
///
/// # Example
///
/// ```no_run
/// use time_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Night band starts at {}", loader.policy().night_window.start);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: LedgerConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `policy.yaml` or `holidays.yaml` is missing or any
    /// file contains invalid YAML. `employees.yaml` may be absent.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<LedgerPolicy>(&path.join("policy.yaml"))?;
        let holidays_config = Self::load_yaml::<HolidaysConfig>(&path.join("holidays.yaml"))?;

        let employees_path = path.join("employees.yaml");
        let employees = if employees_path.exists() {
            Self::load_yaml::<EmployeesConfig>(&employees_path)?.employees
        } else {
            Vec::new()
        };

        let holidays = holidays_config
            .holidays
            .into_iter()
            .map(|seed| seed.into_holiday(policy.default_holiday_multiplier))
            .collect();

        Ok(Self {
            config: LedgerConfig::new(policy, holidays, employees),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Returns the policy.
    pub fn policy(&self) -> &LedgerPolicy {
        self.config.policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
    }

    #[test]
    fn test_multipliers_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let multipliers = &loader.policy().multipliers;
        assert_eq!(multipliers.diurna, dec("1.5"));
        assert_eq!(multipliers.nocturna, dec("1.75"));
        assert_eq!(multipliers.dominical, dec("2.0"));
        assert_eq!(loader.policy().default_holiday_multiplier, dec("1.75"));
    }

    #[test]
    fn test_night_window_and_working_days_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let policy = loader.policy();
        assert_eq!(
            policy.night_window.start,
            NaiveTime::from_hms_opt(21, 0, 0).unwrap()
        );
        assert_eq!(
            policy.night_window.end,
            NaiveTime::from_hms_opt(6, 0, 0).unwrap()
        );
        assert!(policy.is_working_day(Weekday::Mon));
        assert!(!policy.is_working_day(Weekday::Sun));
        assert_eq!(policy.vacation.annual_days, 15);
    }

    #[test]
    fn test_seed_schedule_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let schedule = loader.policy().schedule.as_ref().unwrap();
        assert_eq!(schedule.entry_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(schedule.exit_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(schedule.tolerance_minutes, 10);
    }

    #[test]
    fn test_holidays_loaded_with_default_multiplier() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let holidays = loader.config().holidays();
        assert!(!holidays.is_empty());

        let new_year = holidays
            .iter()
            .find(|h| h.date == NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();
        assert!(new_year.irrenunciable);
        assert_eq!(new_year.multiplier, dec("1.75"));
    }

    #[test]
    fn test_employees_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert!(loader.config().employees().iter().any(|e| e.id == "emp_001"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("policy.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
