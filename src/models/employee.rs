//! Employee reference model.
//!
//! Employees are owned by the HR module of the dashboard. The ledger only
//! references them by id and checks the active flag before accepting new
//! attendance, overtime or vacation records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee as exposed by the external employee directory.
///
/// # Example
///
/// ```
/// use time_ledger::models::Employee;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     hourly_rate: Decimal::new(5500, 0),
///     active: true,
/// };
/// assert!(employee.active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Base hourly rate, used to estimate the value of overtime.
    pub hourly_rate: Decimal,
    /// Inactive employees cannot receive new records.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Estimated pay for a number of pay-equivalent hours.
    ///
    /// # Examples
    ///
    /// ```
    /// use time_ledger::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     hourly_rate: Decimal::new(5000, 0),
    ///     active: true,
    /// };
    /// assert_eq!(employee.value_of(Decimal::new(30, 1)), Decimal::new(15000, 0));
    /// ```
    pub fn value_of(&self, equivalent_hours: Decimal) -> Decimal {
        (equivalent_hours * self.hourly_rate).round_dp(2)
    }
}
