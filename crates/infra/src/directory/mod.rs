//! Collaborator stores for workforce records.
//!
//! These are narrow read/insert contracts. Any backend that can list, fetch by
//! key and insert satisfies them; the in-memory directory backs tests and the
//! seeded demo deployment.

use std::sync::Arc;

use thiserror::Error;

use hris_core::EmployeeId;
use hris_workforce::{AttendanceRecord, EmployeeRecord, PayrollRecord};

pub mod in_memory;

pub use in_memory::InMemoryDirectory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("directory storage failure: {0}")]
    Storage(String),
}

pub trait EmployeeStore: Send + Sync {
    /// Every employee, in insertion order.
    fn list_all(&self) -> Result<Vec<EmployeeRecord>, DirectoryError>;

    fn get_by_id(&self, id: &EmployeeId) -> Result<EmployeeRecord, DirectoryError>;

    fn insert(&self, employee: EmployeeRecord) -> Result<(), DirectoryError>;
}

pub trait PayrollLedger: Send + Sync {
    fn list_all(&self) -> Result<Vec<PayrollRecord>, DirectoryError>;

    fn list_for_employee(&self, id: &EmployeeId) -> Result<Vec<PayrollRecord>, DirectoryError>;

    fn insert(&self, record: PayrollRecord) -> Result<(), DirectoryError>;
}

pub trait AttendanceLog: Send + Sync {
    fn list_all(&self) -> Result<Vec<AttendanceRecord>, DirectoryError>;

    /// Attendance days of one employee, oldest first.
    fn list_for_employee(&self, id: &EmployeeId) -> Result<Vec<AttendanceRecord>, DirectoryError>;

    fn insert(&self, record: AttendanceRecord) -> Result<(), DirectoryError>;
}

impl<S> EmployeeStore for Arc<S>
where
    S: EmployeeStore + ?Sized,
{
    fn list_all(&self) -> Result<Vec<EmployeeRecord>, DirectoryError> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: &EmployeeId) -> Result<EmployeeRecord, DirectoryError> {
        (**self).get_by_id(id)
    }

    fn insert(&self, employee: EmployeeRecord) -> Result<(), DirectoryError> {
        (**self).insert(employee)
    }
}

impl<S> PayrollLedger for Arc<S>
where
    S: PayrollLedger + ?Sized,
{
    fn list_all(&self) -> Result<Vec<PayrollRecord>, DirectoryError> {
        (**self).list_all()
    }

    fn list_for_employee(&self, id: &EmployeeId) -> Result<Vec<PayrollRecord>, DirectoryError> {
        (**self).list_for_employee(id)
    }

    fn insert(&self, record: PayrollRecord) -> Result<(), DirectoryError> {
        (**self).insert(record)
    }
}

impl<S> AttendanceLog for Arc<S>
where
    S: AttendanceLog + ?Sized,
{
    fn list_all(&self) -> Result<Vec<AttendanceRecord>, DirectoryError> {
        (**self).list_all()
    }

    fn list_for_employee(&self, id: &EmployeeId) -> Result<Vec<AttendanceRecord>, DirectoryError> {
        (**self).list_for_employee(id)
    }

    fn insert(&self, record: AttendanceRecord) -> Result<(), DirectoryError> {
        (**self).insert(record)
    }
}
