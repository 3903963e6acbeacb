//! Configuration loading and management for the ledger engine.
//!
//! This module loads the ledger policy (overtime multipliers, night band,
//! working days, vacation entitlement, seed schedule), the seed holiday
//! calendar and an optional seed employee directory from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use time_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded {} holidays", config.config().holidays().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EmployeesConfig, HolidaySeed, HolidaysConfig, LedgerConfig, LedgerPolicy, NightWindow,
    OvertimeMultipliers, VacationPolicy,
};
