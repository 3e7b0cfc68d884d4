use serde::{Deserialize, Serialize};

use hris_core::{EmployeeId, Entity};

/// Categorical performance rating.
///
/// Ratings outside the fixed scale are kept verbatim as [`PerformanceRating::Unrated`]
/// so the original label is still visible; they score like `Average`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Unrated(String),
}

impl PerformanceRating {
    /// Parse a stored label. Total: unknown labels become `Unrated`.
    pub fn parse(label: &str) -> Self {
        match label {
            "Excellent" => PerformanceRating::Excellent,
            "Good" => PerformanceRating::Good,
            "Average" => PerformanceRating::Average,
            "Below Average" | "BelowAverage" => PerformanceRating::BelowAverage,
            other => PerformanceRating::Unrated(other.to_string()),
        }
    }

    /// Ordinal encoding used by the risk models.
    pub fn score(&self) -> u8 {
        match self {
            PerformanceRating::Excellent => 3,
            PerformanceRating::Good => 2,
            PerformanceRating::Average => 1,
            PerformanceRating::BelowAverage => 0,
            PerformanceRating::Unrated(_) => 1,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PerformanceRating::Excellent => "Excellent",
            PerformanceRating::Good => "Good",
            PerformanceRating::Average => "Average",
            PerformanceRating::BelowAverage => "Below Average",
            PerformanceRating::Unrated(label) => label,
        }
    }

    /// The four ratings of the fixed scale, best first.
    pub fn scale() -> [PerformanceRating; 4] {
        [
            PerformanceRating::Excellent,
            PerformanceRating::Good,
            PerformanceRating::Average,
            PerformanceRating::BelowAverage,
        ]
    }
}

impl From<String> for PerformanceRating {
    fn from(value: String) -> Self {
        PerformanceRating::parse(&value)
    }
}

impl From<PerformanceRating> for String {
    fn from(value: PerformanceRating) -> Self {
        match value {
            PerformanceRating::Unrated(label) => label,
            known => known.label().to_string(),
        }
    }
}

/// Employee master record.
///
/// Read-only to the risk pipeline. Numeric attributes are optional because
/// source documents may omit them; `salary_pending` decodes leniently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub salary: Option<u64>,
    #[serde(default)]
    pub tenure_years: Option<u32>,
    #[serde(default)]
    pub performance: Option<PerformanceRating>,
    #[serde(default)]
    pub absence_count: Option<u32>,
    #[serde(default, deserialize_with = "crate::lenient::flag")]
    pub salary_pending: bool,
}

impl EmployeeRecord {
    /// A record with only identity set; every attribute is missing.
    pub fn new(employee_id: EmployeeId, name: impl Into<String>) -> Self {
        Self {
            employee_id,
            name: name.into(),
            department: None,
            salary: None,
            tenure_years: None,
            performance: None,
            absence_count: None,
            salary_pending: false,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_salary(mut self, salary: u64) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn with_tenure(mut self, years: u32) -> Self {
        self.tenure_years = Some(years);
        self
    }

    pub fn with_performance(mut self, rating: PerformanceRating) -> Self {
        self.performance = Some(rating);
        self
    }

    pub fn with_absences(mut self, count: u32) -> Self {
        self.absence_count = Some(count);
        self
    }

    pub fn with_salary_pending(mut self, pending: bool) -> Self {
        self.salary_pending = pending;
        self
    }
}

impl Entity for EmployeeRecord {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.employee_id
    }
}
