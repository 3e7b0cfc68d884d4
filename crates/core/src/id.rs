//! Strongly-typed identifiers used across the HRIS.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Business identifier of an employee (e.g. `E101`).
///
/// Unlike generated surrogate keys, employee ids are assigned by HR when the
/// record is created and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Build an id from its formatted parts, e.g. `("E", 101)` -> `E101`.
    ///
    /// Counters are zero-padded to three digits (`PAY001`).
    pub fn from_counter(prefix: &str, counter: u32) -> Self {
        Self(format!("{prefix}{counter:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmployeeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("EmployeeId: empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for EmployeeId {
    /// Infallible conversion for literals and already-validated ids.
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<EmployeeId> for String {
    fn from(value: EmployeeId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_ids_are_zero_padded() {
        assert_eq!(EmployeeId::from_counter("E", 101).as_str(), "E101");
        assert_eq!(EmployeeId::from_counter("PAY", 1).as_str(), "PAY001");
    }

    #[test]
    fn parse_rejects_blank_ids() {
        assert!(matches!("   ".parse::<EmployeeId>(), Err(DomainError::InvalidId(_))));
        assert_eq!(" E7 ".parse::<EmployeeId>().unwrap().as_str(), "E7");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = EmployeeId::from("E101");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"E101\"");
    }
}
