//! Ground-truth labeling rules and training-set assembly.
//!
//! The risk models are trained on labels derived from these rules, so the
//! rules are what a trained model is expected to reproduce at inference time.

use serde::{Deserialize, Serialize};

use hris_workforce::{EmployeeRecord, PerformanceRating};

use crate::features::{FEATURE_COUNT, FeatureExtractor, FeatureVector};
use crate::model::RiskModelKind;

/// Below this many live rows the fixed fallback table is used instead.
pub const MIN_LIVE_ROWS: usize = 5;

/// Payroll anomaly: pending salary, heavy absence, very low performance, or a
/// low rating paired with a high salary.
pub fn payroll_anomaly_label(employee: &EmployeeRecord) -> bool {
    let f = FeatureExtractor::extract(employee);
    employee.salary_pending
        || f.absence_count >= 7
        || f.performance_score == 0
        || (f.performance_score <= 1 && f.salary > 60_000)
}

/// Attrition risk: new joiners, very low performance, heavy absence, or an
/// underpaid below-average performer.
pub fn attrition_label(employee: &EmployeeRecord) -> bool {
    let f = FeatureExtractor::extract(employee);
    let below_average = matches!(employee.performance, Some(PerformanceRating::BelowAverage));
    f.tenure_years <= 1
        || f.performance_score == 0
        || f.absence_count >= 6
        || (below_average && f.salary < 35_000)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub label: bool,
}

/// Where a training set came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingSource {
    /// Labeled from the current employee population.
    Live,
    /// The fixed 8-row table, used when the live population is too small.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSet {
    pub kind: RiskModelKind,
    pub source: TrainingSource,
    pub rows: Vec<TrainingRow>,
}

impl TrainingSet {
    /// Label the live population, or substitute the fallback table when it has
    /// fewer than [`MIN_LIVE_ROWS`] records.
    pub fn from_employees(kind: RiskModelKind, employees: &[EmployeeRecord]) -> Self {
        if employees.len() < MIN_LIVE_ROWS {
            return Self::fallback(kind);
        }

        let label = match kind {
            RiskModelKind::Payroll => payroll_anomaly_label,
            RiskModelKind::Attrition => attrition_label,
        };

        let rows = employees
            .iter()
            .map(|e| TrainingRow {
                features: FeatureExtractor::extract(e),
                label: label(e),
            })
            .collect();

        Self {
            kind,
            source: TrainingSource::Live,
            rows,
        }
    }

    pub fn fallback(kind: RiskModelKind) -> Self {
        let table = match kind {
            RiskModelKind::Payroll => &PAYROLL_FALLBACK,
            RiskModelKind::Attrition => &ATTRITION_FALLBACK,
        };

        let rows = table
            .iter()
            .map(|&(tenure, salary, perf, absence, label)| TrainingRow {
                features: FeatureVector::new(tenure, salary, perf, absence),
                label,
            })
            .collect();

        Self {
            kind,
            source: TrainingSource::Fallback,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.rows.iter().filter(|r| r.label).count()
    }

    /// Split into classifier inputs and labels.
    pub fn matrix(&self) -> (Vec<[f64; FEATURE_COUNT]>, Vec<bool>) {
        self.rows
            .iter()
            .map(|r| (r.features.values(), r.label))
            .unzip()
    }
}

type FallbackRow = (u32, u64, u8, u32, bool);

/// (tenure, salary, performance_score, absence, anomaly)
const PAYROLL_FALLBACK: [FallbackRow; 8] = [
    (1, 30_000, 2, 0, false),
    (2, 40_000, 3, 1, false),
    (3, 60_000, 0, 10, true),
    (4, 45_000, 2, 2, false),
    (5, 35_000, 3, 0, false),
    (6, 75_000, 0, 9, true),
    (2, 32_000, 0, 4, true),
    (3, 41_000, 2, 1, false),
];

/// (tenure, salary, performance_score, absence, at_risk)
const ATTRITION_FALLBACK: [FallbackRow; 8] = [
    (0, 28_000, 0, 7, true),
    (1, 35_000, 1, 4, true),
    (2, 45_000, 2, 2, false),
    (3, 60_000, 3, 0, false),
    (5, 70_000, 2, 1, false),
    (7, 80_000, 3, 0, false),
    (1, 32_000, 0, 8, true),
    (0, 30_000, 1, 5, true),
];
