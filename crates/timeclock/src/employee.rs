//! Employee profiles and the validated national ID that keys them.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::camera::ImageRef;
use crate::error::ValidationError;

/// Number of digits in a national ID.
pub const EMPLOYEE_ID_LEN: usize = 13;

fn employee_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{13}$").expect("static pattern compiles"))
}

fn partial_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{0,13}$").expect("static pattern compiles"))
}

/// A 13-digit national ID.
///
/// The only way to get one is through [`EmployeeId::parse`], so anything
/// holding an `EmployeeId` already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Validate and wrap an ID.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmployeeId`] unless `value` is exactly
    /// 13 ASCII digits.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if employee_id_pattern().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidEmployeeId { value })
        }
    }

    /// Check whether `value` could still grow into a valid ID.
    #[must_use]
    pub fn is_valid_prefix(value: &str) -> bool {
        partial_id_pattern().is_match(value)
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmployeeId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EmployeeId> for String {
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

impl std::str::FromStr for EmployeeId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A registered employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// National ID, unique within the registry.
    pub id: EmployeeId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Profile photo.
    pub photo_url: ImageRef,
}

impl Employee {
    /// Create an employee from already-validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if either name is blank.
    pub fn new(
        id: EmployeeId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        photo_url: ImageRef,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        if first_name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "first_name" });
        }
        if last_name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "last_name" });
        }
        Ok(Self {
            id,
            first_name,
            last_name,
            photo_url,
        })
    }

    /// "First Last", as recorded on log entries.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
