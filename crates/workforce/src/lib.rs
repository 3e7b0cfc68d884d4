//! Workforce records: employees, payroll ledger entries, attendance days.
//!
//! These are plain typed records (no IO). Source documents are loosely
//! structured, so missing attributes decode as `None` and the consumers
//! (feature extraction, dashboards) own the defaulting rules.

pub mod attendance;
pub mod employee;
pub mod lenient;
pub mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use employee::{EmployeeRecord, PerformanceRating};
pub use payroll::{PayrollRecord, PayrollStatus};
