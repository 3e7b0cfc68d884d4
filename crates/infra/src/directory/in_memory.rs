use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hris_core::{EmployeeId, Entity};
use hris_workforce::{AttendanceRecord, EmployeeRecord, PayrollRecord};

use super::{AttendanceLog, DirectoryError, EmployeeStore, PayrollLedger};

/// In-memory employee directory, payroll ledger and attendance log.
///
/// Collections keep insertion order. Intended for tests/dev and the seeded
/// demo deployment.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<Vec<EmployeeRecord>>,
    payrolls: RwLock<Vec<PayrollRecord>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, DirectoryError> {
    lock.read()
        .map_err(|_| DirectoryError::Storage("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, DirectoryError> {
    lock.write()
        .map_err(|_| DirectoryError::Storage("lock poisoned".to_string()))
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn employee_count(&self) -> usize {
        self.employees.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn payroll_count(&self) -> usize {
        self.payrolls.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn attendance_count(&self) -> usize {
        self.attendance.read().map(|a| a.len()).unwrap_or(0)
    }
}

impl EmployeeStore for InMemoryDirectory {
    fn list_all(&self) -> Result<Vec<EmployeeRecord>, DirectoryError> {
        Ok(read(&self.employees)?.clone())
    }

    fn get_by_id(&self, id: &EmployeeId) -> Result<EmployeeRecord, DirectoryError> {
        read(&self.employees)?
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))
    }

    fn insert(&self, employee: EmployeeRecord) -> Result<(), DirectoryError> {
        let mut employees = write(&self.employees)?;
        if employees.iter().any(|e| e.id() == employee.id()) {
            return Err(DirectoryError::Duplicate(format!(
                "employee {}",
                employee.employee_id
            )));
        }
        employees.push(employee);
        Ok(())
    }
}

impl PayrollLedger for InMemoryDirectory {
    fn list_all(&self) -> Result<Vec<PayrollRecord>, DirectoryError> {
        Ok(read(&self.payrolls)?.clone())
    }

    fn list_for_employee(&self, id: &EmployeeId) -> Result<Vec<PayrollRecord>, DirectoryError> {
        Ok(read(&self.payrolls)?
            .iter()
            .filter(|p| &p.employee_id == id)
            .cloned()
            .collect())
    }

    fn insert(&self, record: PayrollRecord) -> Result<(), DirectoryError> {
        let mut payrolls = write(&self.payrolls)?;
        if payrolls
            .iter()
            .any(|p| p.employee_id == record.employee_id && p.month == record.month)
        {
            return Err(DirectoryError::Duplicate(format!(
                "payroll for {} in {}",
                record.employee_id, record.month
            )));
        }
        payrolls.push(record);
        Ok(())
    }
}

impl AttendanceLog for InMemoryDirectory {
    fn list_all(&self) -> Result<Vec<AttendanceRecord>, DirectoryError> {
        Ok(read(&self.attendance)?.clone())
    }

    fn list_for_employee(&self, id: &EmployeeId) -> Result<Vec<AttendanceRecord>, DirectoryError> {
        let mut days: Vec<AttendanceRecord> = read(&self.attendance)?
            .iter()
            .filter(|a| &a.employee_id == id)
            .cloned()
            .collect();
        days.sort_by_key(|a| a.date);
        Ok(days)
    }

    fn insert(&self, record: AttendanceRecord) -> Result<(), DirectoryError> {
        let mut attendance = write(&self.attendance)?;
        if attendance
            .iter()
            .any(|a| a.employee_id == record.employee_id && a.date == record.date)
        {
            return Err(DirectoryError::Duplicate(format!(
                "attendance for {} on {}",
                record.employee_id, record.date
            )));
        }
        attendance.push(record);
        Ok(())
    }
}
