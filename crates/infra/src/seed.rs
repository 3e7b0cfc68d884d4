//! Demo data for a fresh deployment.
//!
//! Each collection is seeded only when it is empty, so running this on every
//! startup is harmless.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use hris_core::EmployeeId;
use hris_workforce::{
    AttendanceRecord, AttendanceStatus, EmployeeRecord, PayrollRecord, PayrollStatus, PerformanceRating,
};

use crate::directory::{AttendanceLog, DirectoryError, EmployeeStore, PayrollLedger};

pub const DEFAULT_SEED: u64 = 42;

const EMPLOYEES: u32 = 20;
const DEPARTMENTS: [&str; 6] = ["Sales", "HR", "Dev", "Support", "Finance", "Marketing"];
const SALARIES: [u64; 7] = [30_000, 35_000, 40_000, 45_000, 50_000, 55_000, 60_000];
const PAYROLL_MONTH: &str = "2025-09";
const ATTENDANCE_DAYS: u32 = 10;
const UNKNOWN_SALARY_AMOUNT: u64 = 30_000;

/// Records inserted by one [`seed_sample_data`] call.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub employees: usize,
    pub payrolls: usize,
    pub attendance: usize,
}

pub fn seed_sample_data<D>(directory: &D, seed: u64) -> Result<SeedReport, DirectoryError>
where
    D: EmployeeStore + PayrollLedger + AttendanceLog,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut report = SeedReport::default();

    if EmployeeStore::list_all(directory)?.is_empty() {
        for i in 1..=EMPLOYEES {
            EmployeeStore::insert(directory, sample_employee(&mut rng, i))?;
            report.employees += 1;
        }
    }

    let employees = EmployeeStore::list_all(directory)?;

    if PayrollLedger::list_all(directory)?.is_empty() {
        for (idx, e) in employees.iter().enumerate() {
            let status = if rng.gen_bool(0.5) {
                PayrollStatus::Pending
            } else {
                PayrollStatus::Processed
            };
            PayrollLedger::insert(
                directory,
                PayrollRecord {
                    payroll_id: format!("PAY{:03}", idx + 1),
                    employee_id: e.employee_id.clone(),
                    month: PAYROLL_MONTH.to_string(),
                    amount: e.salary.unwrap_or(UNKNOWN_SALARY_AMOUNT),
                    status,
                },
            )?;
            report.payrolls += 1;
        }
    }

    if AttendanceLog::list_all(directory)?.is_empty() {
        for (idx, e) in employees.iter().enumerate() {
            for d in 1..=ATTENDANCE_DAYS {
                let Some(date) = NaiveDate::from_ymd_opt(2025, 9, d) else {
                    continue;
                };
                let status = if rng.gen_bool(0.8) {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                };
                AttendanceLog::insert(
                    directory,
                    AttendanceRecord {
                        attendance_id: format!("ATT{:03}", (idx as u32 + 1) * 10 + d),
                        employee_id: e.employee_id.clone(),
                        date,
                        status,
                    },
                )?;
                report.attendance += 1;
            }
        }
    }

    if report != SeedReport::default() {
        info!(
            employees = report.employees,
            payrolls = report.payrolls,
            attendance = report.attendance,
            "seeded sample data"
        );
    }
    Ok(report)
}

fn sample_employee(rng: &mut StdRng, i: u32) -> EmployeeRecord {
    let scale = PerformanceRating::scale();
    let department = DEPARTMENTS.choose(rng).copied().unwrap_or("Sales");
    let salary = SALARIES.choose(rng).copied().unwrap_or(UNKNOWN_SALARY_AMOUNT);
    let tenure = rng.gen_range(0..=10);
    let rating = scale.choose(rng).cloned().unwrap_or(PerformanceRating::Average);
    let absences = rng.gen_range(0..=8);
    let pending = rng.gen_ratio(1, 4);

    EmployeeRecord::new(EmployeeId::from_counter("E", 100 + i), format!("Employee {i}"))
        .with_department(department)
        .with_salary(salary)
        .with_tenure(tenure)
        .with_performance(rating)
        .with_absences(absences)
        .with_salary_pending(pending)
}
