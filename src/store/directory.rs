//! Employee lookups.
//!
//! Employees live outside the ledger. The engine only needs to know whether
//! an id exists, whether it is active, and its hourly rate.

use std::collections::HashMap;

use crate::error::EngineResult;
use crate::models::Employee;

/// Read-only view of the external employee directory.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by id.
    fn employee(&self, id: &str) -> EngineResult<Option<Employee>>;
}

/// A fixed directory, seeded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    employees: HashMap<String, Employee>,
}

impl StaticDirectory {
    /// Builds the directory. A later employee with the same id replaces an
    /// earlier one.
    pub fn new(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: employees.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl EmployeeDirectory for StaticDirectory {
    fn employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.employees.get(id).cloned())
    }
}
