//! Feature extraction.
//!
//! Both risk models are trained and queried against the same ordered schema.
//! Reordering or extending it invalidates every persisted model artifact, which
//! is why the schema is recorded inside each artifact and checked on load.

use serde::{Deserialize, Serialize};

use hris_workforce::EmployeeRecord;

pub const FEATURE_COUNT: usize = 4;

/// Column names, in vector order.
pub const FEATURE_SCHEMA: [&str; FEATURE_COUNT] =
    ["tenure_years", "salary", "performance_score", "absence_count"];

pub const DEFAULT_SALARY: u64 = 30_000;
pub const DEFAULT_TENURE_YEARS: u32 = 0;
pub const DEFAULT_ABSENCE_COUNT: u32 = 0;
/// Score of an `Average` rating, used for missing or unknown ratings.
pub const DEFAULT_PERFORMANCE_SCORE: u8 = 1;

/// Numeric encoding of one employee.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    pub tenure_years: u32,
    pub salary: u64,
    pub performance_score: u8,
    pub absence_count: u32,
}

impl FeatureVector {
    pub fn new(tenure_years: u32, salary: u64, performance_score: u8, absence_count: u32) -> Self {
        Self {
            tenure_years,
            salary,
            performance_score,
            absence_count,
        }
    }

    /// Classifier input, ordered as [`FEATURE_SCHEMA`].
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.tenure_years),
            self.salary as f64,
            f64::from(self.performance_score),
            f64::from(self.absence_count),
        ]
    }
}

/// Maps employee records to feature vectors. Pure and total.
#[derive(Debug, Default, Copy, Clone)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn extract(employee: &EmployeeRecord) -> FeatureVector {
        FeatureVector {
            tenure_years: employee.tenure_years.unwrap_or(DEFAULT_TENURE_YEARS),
            salary: employee.salary.unwrap_or(DEFAULT_SALARY),
            performance_score: employee
                .performance
                .as_ref()
                .map(|rating| rating.score())
                .unwrap_or(DEFAULT_PERFORMANCE_SCORE),
            absence_count: employee.absence_count.unwrap_or(DEFAULT_ABSENCE_COUNT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hris_core::EmployeeId;
    use hris_workforce::PerformanceRating;
    use proptest::prelude::*;

    #[test]
    fn missing_attributes_take_documented_defaults() {
        let bare = EmployeeRecord::new(EmployeeId::from("E1"), "Bare");
        assert_eq!(FeatureExtractor::extract(&bare), FeatureVector::new(0, 30_000, 1, 0));
    }

    #[test]
    fn values_follow_schema_order() {
        let e = EmployeeRecord::new(EmployeeId::from("E2"), "Full")
            .with_tenure(4)
            .with_salary(52_000)
            .with_performance(PerformanceRating::Good)
            .with_absences(3);

        let v = FeatureExtractor::extract(&e);
        assert_eq!(v.values(), [4.0, 52_000.0, 2.0, 3.0]);
        assert_eq!(FEATURE_SCHEMA[1], "salary");
    }

    proptest! {
        #[test]
        fn unrecognized_ratings_extract_as_average(label in "[a-z ]{0,16}") {
            let e = EmployeeRecord::new(EmployeeId::from("E3"), "Anyone")
                .with_performance(PerformanceRating::parse(&label));
            prop_assert_eq!(FeatureExtractor::extract(&e).performance_score, 1);
        }

        #[test]
        fn present_attributes_pass_through(
            tenure in 0u32..40,
            salary in 0u64..500_000,
            absences in 0u32..60,
        ) {
            let e = EmployeeRecord::new(EmployeeId::from("E4"), "Someone")
                .with_tenure(tenure)
                .with_salary(salary)
                .with_absences(absences);
            let v = FeatureExtractor::extract(&e);
            prop_assert_eq!((v.tenure_years, v.salary, v.absence_count), (tenure, salary, absences));
        }
    }
}
