//! Employee registry.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::config::SeedEmployee;
use crate::employee::{Employee, EmployeeId};
use crate::error::{Result, ValidationError};

/// Registered employees, keyed by national ID, in registration order.
#[derive(Debug, Default)]
pub struct EmployeeRegistry {
    employees: Vec<Employee>,
    index: HashMap<EmployeeId, usize>,
}

impl EmployeeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured seed profiles.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed or duplicated seed.
    pub fn from_seeds(seeds: &[SeedEmployee]) -> Result<Self> {
        let mut registry = Self::new();
        for seed in seeds {
            registry.add(seed.to_employee()?)?;
        }
        Ok(registry)
    }

    /// Register an employee.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateId`] if the ID is taken; the
    /// registry is left unchanged.
    pub fn add(&mut self, employee: Employee) -> std::result::Result<&Employee, ValidationError> {
        if self.index.contains_key(&employee.id) {
            warn!(id = %employee.id, "rejected duplicate employee ID");
            return Err(ValidationError::DuplicateId {
                id: employee.id.to_string(),
            });
        }

        info!(id = %employee.id, name = %employee.display_name(), "registered employee");
        let position = self.employees.len();
        self.index.insert(employee.id.clone(), position);
        self.employees.push(employee);
        Ok(&self.employees[position])
    }

    /// All employees in registration order.
    #[must_use]
    pub fn list(&self) -> &[Employee] {
        &self.employees
    }

    /// Look up an employee by ID.
    #[must_use]
    pub fn find_by_id(&self, id: &EmployeeId) -> Option<&Employee> {
        self.index.get(id).and_then(|&i| self.employees.get(i))
    }

    /// Number of registered employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether nobody is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}
