//! HR dashboard aggregation.
//!
//! Every snapshot is a fresh evaluation: each employee is feature-extracted,
//! scored by both models and run through the trigger rules exactly once, in
//! directory order. Triggers are appended as they are decided, so they
//! accumulate across dashboard loads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use hris_ai::{BinaryClassifier, FeatureExtractor, RandomForest, RiskModel, TriggerEngine};
use hris_core::{Clock, EmployeeId, SystemClock};
use hris_events::TriggerEvent;
use hris_workforce::EmployeeRecord;

use crate::directory::{DirectoryError, PayrollLedger};
use crate::triggers::{DEFAULT_RECENT_LIMIT, TriggerStore, TriggerStoreError};

/// Chart amount for employees without a recorded salary.
const CHART_DEFAULT_AMOUNT: u64 = 30_000;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Trigger(#[from] TriggerStoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeePrediction {
    pub employee_id: EmployeeId,
    pub name: String,
    /// Payroll model's native label.
    pub payroll_risk: bool,
    /// Attrition probability above the 0.5 decision threshold.
    pub attrition_risk: bool,
    /// Rounded to 2 decimals.
    pub attrition_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollChartPoint {
    pub employee_id: EmployeeId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub total_employees: usize,
    /// Pending entries in the payroll ledger (not the `salary_pending` flag).
    pub pending_payrolls: usize,
    pub average_salary: u64,
    pub predictions: Vec<EmployeePrediction>,
    pub payroll_risk_count: usize,
    pub attrition_risk_count: usize,
    /// Triggers appended while building this snapshot.
    pub triggers_emitted: usize,
    pub recent_triggers: Vec<TriggerEvent>,
    pub payroll_chart: Vec<PayrollChartPoint>,
    pub generated_at: DateTime<Utc>,
}

/// Round to `decimals` places; exact halves go to the even digit.
///
/// Forest probabilities are multiples of 1/120, so halves such as 0.125 are
/// common and their rounding is observable.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Integer-truncated mean salary; missing salaries count as 0 and the
/// divisor never drops below 1.
pub fn average_salary(employees: &[EmployeeRecord]) -> u64 {
    let total: u64 = employees.iter().map(|e| e.salary.unwrap_or(0)).sum();
    total / employees.len().max(1) as u64
}

pub struct DashboardAggregator<P = RandomForest, A = RandomForest> {
    payroll: Arc<RiskModel<P>>,
    attrition: Arc<RiskModel<A>>,
    engine: TriggerEngine,
    triggers: Arc<dyn TriggerStore>,
    ledger: Arc<dyn PayrollLedger>,
    clock: Arc<dyn Clock>,
    recent_limit: usize,
}

impl<P, A> DashboardAggregator<P, A>
where
    P: BinaryClassifier,
    A: BinaryClassifier,
{
    pub fn new(
        payroll: Arc<RiskModel<P>>,
        attrition: Arc<RiskModel<A>>,
        triggers: Arc<dyn TriggerStore>,
        ledger: Arc<dyn PayrollLedger>,
    ) -> Self {
        Self {
            payroll,
            attrition,
            engine: TriggerEngine::default(),
            triggers,
            ledger,
            clock: Arc::new(SystemClock),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn with_engine(mut self, engine: TriggerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn build_snapshot(&self, employees: &[EmployeeRecord]) -> Result<DashboardSnapshot, DashboardError> {
        let pending_payrolls = self.ledger.list_all()?.iter().filter(|p| p.is_pending()).count();

        let mut predictions = Vec::with_capacity(employees.len());
        let mut triggers_emitted = 0;

        for employee in employees {
            let features = FeatureExtractor::extract(employee);
            let payroll = self.payroll.classify(&features);
            let attrition = self.attrition.classify(&features);

            for draft in self.engine.evaluate(employee, &features, &payroll, &attrition) {
                let event = self.triggers.append(draft)?;
                triggers_emitted += 1;
                info!(
                    event_type = %event.event_type,
                    employee_id = %employee.employee_id,
                    sequence = event.sequence,
                    "trigger recorded"
                );
            }

            predictions.push(EmployeePrediction {
                employee_id: employee.employee_id.clone(),
                name: employee.name.clone(),
                payroll_risk: payroll.label,
                attrition_risk: attrition.exceeds_decision_threshold(),
                attrition_probability: round_to(attrition.probability, 2),
            });
        }

        let payroll_chart = employees
            .iter()
            .map(|e| PayrollChartPoint {
                employee_id: e.employee_id.clone(),
                amount: e.salary.unwrap_or(CHART_DEFAULT_AMOUNT),
            })
            .collect();

        Ok(DashboardSnapshot {
            total_employees: employees.len(),
            pending_payrolls,
            average_salary: average_salary(employees),
            payroll_risk_count: predictions.iter().filter(|p| p.payroll_risk).count(),
            attrition_risk_count: predictions.iter().filter(|p| p.attrition_risk).count(),
            predictions,
            triggers_emitted,
            recent_triggers: self.triggers.recent(self.recent_limit)?,
            payroll_chart,
            generated_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::triggers::InMemoryTriggerStore;
    use hris_ai::{FEATURE_COUNT, RiskModelKind};
    use hris_events::{NewTrigger, TriggerKind};
    use hris_workforce::{PayrollRecord, PayrollStatus};
    use proptest::prelude::*;

    /// Fixed output regardless of input.
    struct Fixed {
        label: bool,
        probability: f64,
    }

    impl BinaryClassifier for Fixed {
        fn predict(&self, _x: &[f64; FEATURE_COUNT]) -> bool {
            self.label
        }

        fn predict_probability(&self, _x: &[f64; FEATURE_COUNT]) -> f64 {
            self.probability
        }
    }

    /// Positive probability tracks absences: absence_count / 10.
    struct ByAbsence;

    impl BinaryClassifier for ByAbsence {
        fn predict(&self, x: &[f64; FEATURE_COUNT]) -> bool {
            x[3] >= 5.0
        }

        fn predict_probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
            (x[3] / 10.0).min(1.0)
        }
    }

    struct FailingStore;

    impl TriggerStore for FailingStore {
        fn append(&self, _trigger: NewTrigger) -> Result<TriggerEvent, TriggerStoreError> {
            Err(TriggerStoreError::Io(std::io::Error::other("disk full")))
        }

        fn recent(&self, _limit: usize) -> Result<Vec<TriggerEvent>, TriggerStoreError> {
            Ok(Vec::new())
        }
    }

    fn employee(n: u32, salary: Option<u64>, absences: u32) -> EmployeeRecord {
        let mut e = EmployeeRecord::new(EmployeeId::from_counter("E", 100 + n), format!("Employee {n}"))
            .with_absences(absences);
        e.salary = salary;
        e
    }

    fn aggregator<P: BinaryClassifier, A: BinaryClassifier>(
        payroll: P,
        attrition: A,
        triggers: Arc<dyn TriggerStore>,
        ledger: Arc<InMemoryDirectory>,
    ) -> DashboardAggregator<P, A> {
        DashboardAggregator::new(
            Arc::new(RiskModel::from_classifier(RiskModelKind::Payroll, payroll)),
            Arc::new(RiskModel::from_classifier(RiskModelKind::Attrition, attrition)),
            triggers,
            ledger,
        )
    }

    #[test]
    fn empty_population_yields_zero_average_without_dividing_by_zero() {
        let agg = aggregator(
            Fixed { label: false, probability: 0.0 },
            Fixed { label: false, probability: 0.0 },
            Arc::new(InMemoryTriggerStore::new()),
            Arc::new(InMemoryDirectory::new()),
        );
        let snap = agg.build_snapshot(&[]).unwrap();

        assert_eq!(snap.total_employees, 0);
        assert_eq!(snap.average_salary, 0);
        assert!(snap.predictions.is_empty());
        assert!(snap.recent_triggers.is_empty());
    }

    #[test]
    fn average_salary_truncates_and_counts_missing_as_zero() {
        let employees = vec![
            employee(1, Some(40_000), 0),
            employee(2, Some(35_001), 0),
            employee(3, None, 0),
        ];
        // (40000 + 35001 + 0) / 3 = 25000.33
        assert_eq!(average_salary(&employees), 25_000);
    }

    #[test]
    fn payroll_flag_is_native_and_attrition_flag_is_recomputed() {
        let agg = aggregator(
            Fixed { label: true, probability: 0.1 },
            Fixed { label: false, probability: 0.556 },
            Arc::new(InMemoryTriggerStore::new()),
            Arc::new(InMemoryDirectory::new()),
        );
        let snap = agg.build_snapshot(&[employee(1, Some(50_000), 0)]).unwrap();

        let p = &snap.predictions[0];
        assert!(p.payroll_risk);
        assert!(p.attrition_risk);
        assert_eq!(p.attrition_probability, 0.56);
        assert_eq!((snap.payroll_risk_count, snap.attrition_risk_count), (1, 1));
    }

    #[test]
    fn pending_count_comes_from_the_ledger() {
        let dir = Arc::new(InMemoryDirectory::new());
        for (i, status) in [PayrollStatus::Pending, PayrollStatus::Processed, PayrollStatus::Pending]
            .into_iter()
            .enumerate()
        {
            PayrollLedger::insert(
                &*dir,
                PayrollRecord {
                    payroll_id: format!("PAY{:03}", i + 1),
                    employee_id: EmployeeId::from_counter("E", 101 + i as u32),
                    month: "2025-09".to_string(),
                    amount: 30_000,
                    status,
                },
            )
            .unwrap();
        }

        let agg = aggregator(
            Fixed { label: false, probability: 0.0 },
            Fixed { label: false, probability: 0.0 },
            Arc::new(InMemoryTriggerStore::new()),
            dir,
        );
        // salary_pending on the record does not feed this count.
        let e = employee(1, Some(30_000), 0).with_salary_pending(true);
        assert_eq!(agg.build_snapshot(&[e]).unwrap().pending_payrolls, 2);
    }

    #[test]
    fn triggers_accumulate_across_loads_and_show_newest_first() {
        let store = Arc::new(InMemoryTriggerStore::new());
        let agg = aggregator(
            Fixed { label: false, probability: 0.0 },
            ByAbsence,
            store.clone(),
            Arc::new(InMemoryDirectory::new()),
        );
        // E101: 9 absences -> attrition 0.9 and high absence; E102: quiet.
        let employees = vec![employee(1, Some(40_000), 9), employee(2, Some(40_000), 1)];

        let first = agg.build_snapshot(&employees).unwrap();
        assert_eq!(first.triggers_emitted, 2);
        let second = agg.build_snapshot(&employees).unwrap();
        assert_eq!(second.triggers_emitted, 2);
        assert_eq!(store.len(), 4);

        assert_eq!(second.recent_triggers.len(), 4);
        let kinds: Vec<TriggerKind> = store.all().into_iter().map(|t| t.event_type).collect();
        assert_eq!(
            kinds,
            vec![
                TriggerKind::HighAttritionRisk,
                TriggerKind::HighAbsence,
                TriggerKind::HighAttritionRisk,
                TriggerKind::HighAbsence,
            ]
        );
    }

    #[test]
    fn chart_uses_salary_or_default_amount() {
        let agg = aggregator(
            Fixed { label: false, probability: 0.0 },
            Fixed { label: false, probability: 0.0 },
            Arc::new(InMemoryTriggerStore::new()),
            Arc::new(InMemoryDirectory::new()),
        );
        let snap = agg
            .build_snapshot(&[employee(1, Some(55_000), 0), employee(2, None, 0)])
            .unwrap();
        let amounts: Vec<u64> = snap.payroll_chart.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![55_000, 30_000]);
    }

    #[test]
    fn trigger_append_failure_is_surfaced() {
        let agg = aggregator(
            Fixed { label: true, probability: 0.0 },
            Fixed { label: false, probability: 0.0 },
            Arc::new(FailingStore),
            Arc::new(InMemoryDirectory::new()),
        );
        assert!(matches!(
            agg.build_snapshot(&[employee(1, Some(30_000), 0)]),
            Err(DashboardError::Trigger(_))
        ));
    }

    #[test]
    fn recent_triggers_are_capped() {
        let agg = aggregator(
            Fixed { label: true, probability: 0.95 },
            Fixed { label: true, probability: 0.95 },
            Arc::new(InMemoryTriggerStore::new()),
            Arc::new(InMemoryDirectory::new()),
        );
        let employees: Vec<EmployeeRecord> = (1..=6).map(|n| employee(n, Some(30_000), 7)).collect();
        let snap = agg.build_snapshot(&employees).unwrap();

        assert_eq!(snap.triggers_emitted, 18);
        assert_eq!(snap.recent_triggers.len(), 10);
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(round_to(15.0 / 120.0, 2), 0.12);
        assert_eq!(round_to(75.0 / 120.0, 2), 0.62);
        assert_eq!(round_to(45.0 / 120.0, 2), 0.38);
        assert_eq!(round_to(0.0625, 3), 0.062);
        assert_eq!(round_to(0.126, 2), 0.13);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn rounding_stays_within_half_a_cent(p in 0.0f64..=1.0) {
            let r = round_to(p, 2);
            prop_assert!((r - p).abs() <= 0.005 + 1e-12);
            prop_assert!((0.0..=1.0).contains(&r));
        }

        #[test]
        fn average_never_exceeds_max_salary(salaries in prop::collection::vec(0u64..200_000, 0..40)) {
            let employees: Vec<EmployeeRecord> = salaries
                .iter()
                .enumerate()
                .map(|(i, &s)| employee(i as u32, Some(s), 0))
                .collect();
            let avg = average_salary(&employees);
            prop_assert!(avg <= salaries.iter().copied().max().unwrap_or(0));
        }
    }
}
