use serde::{Deserialize, Serialize};

use hris_core::EmployeeId;

/// Processing status of a ledger entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    Processed,
    Pending,
    /// Any status label this system does not model.
    #[serde(other)]
    Unknown,
}

/// One payroll ledger entry. Unique per `(employee_id, month)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub payroll_id: String,
    pub employee_id: EmployeeId,
    /// Pay period as `YYYY-MM`.
    pub month: String,
    pub amount: u64,
    pub status: PayrollStatus,
}

impl PayrollRecord {
    pub fn is_pending(&self) -> bool {
        self.status == PayrollStatus::Pending
    }
}
