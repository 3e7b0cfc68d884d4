//! Trigger rules evaluated per scored employee.
//!
//! Conditions are independent and all checked on every call; one employee can
//! raise up to three triggers at once.

use serde::{Deserialize, Serialize};

use hris_events::{NewTrigger, TriggerKind};
use hris_workforce::EmployeeRecord;

use crate::features::FeatureVector;
use crate::model::ClassificationResult;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerThresholds {
    /// "High Attrition Risk" fires strictly above this probability.
    pub attrition_probability: f64,
    /// "High Absence" fires strictly above this count.
    pub absence_count: u32,
}

impl Default for TriggerThresholds {
    fn default() -> Self {
        Self {
            attrition_probability: 0.8,
            absence_count: 5,
        }
    }
}

/// Stateless rule set. Emitted drafts are persisted by the caller.
#[derive(Debug, Default, Clone)]
pub struct TriggerEngine {
    thresholds: TriggerThresholds,
}

impl TriggerEngine {
    pub fn new(thresholds: TriggerThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &TriggerThresholds {
        &self.thresholds
    }

    /// Decide the triggers raised by one employee.
    ///
    /// Attrition is judged on its probability; payroll anomaly on the payroll
    /// model's native label. The absence rule reads the record itself, so a
    /// missing count never fires.
    pub fn evaluate(
        &self,
        employee: &EmployeeRecord,
        _features: &FeatureVector,
        payroll: &ClassificationResult,
        attrition: &ClassificationResult,
    ) -> Vec<NewTrigger> {
        let who = format!("{} ({})", employee.name, employee.employee_id);
        let mut out = Vec::new();

        if attrition.probability > self.thresholds.attrition_probability {
            out.push(NewTrigger::new(
                TriggerKind::HighAttritionRisk,
                format!(
                    "Employee {who} shows {:.1}% chance of leaving.",
                    attrition.probability * 100.0
                ),
            ));
        }

        if payroll.label {
            out.push(NewTrigger::new(
                TriggerKind::PayrollAnomaly,
                format!("Payroll irregularity detected for {who}."),
            ));
        }

        let absences = employee.absence_count.unwrap_or(0);
        if absences > self.thresholds.absence_count {
            out.push(NewTrigger::new(
                TriggerKind::HighAbsence,
                format!("{who} has {absences} absences."),
            ));
        }

        out.into_iter()
            .map(|t| t.for_employee(employee.employee_id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureExtractor;
    use hris_core::EmployeeId;
    use proptest::prelude::*;

    fn result(label: bool, probability: f64) -> ClassificationResult {
        ClassificationResult { label, probability }
    }

    fn employee(absences: u32) -> EmployeeRecord {
        EmployeeRecord::new(EmployeeId::from("E107"), "Employee 7").with_absences(absences)
    }

    fn kinds(employee: &EmployeeRecord, payroll: ClassificationResult, attrition: ClassificationResult) -> Vec<TriggerKind> {
        let features = FeatureExtractor::extract(employee);
        TriggerEngine::default()
            .evaluate(employee, &features, &payroll, &attrition)
            .into_iter()
            .map(|t| t.event_type)
            .collect()
    }

    #[test]
    fn attrition_threshold_is_strict() {
        let e = employee(0);
        assert!(kinds(&e, result(false, 0.0), result(true, 0.80)).is_empty());
        assert_eq!(
            kinds(&e, result(false, 0.0), result(true, 0.81)),
            vec![TriggerKind::HighAttritionRisk]
        );
    }

    #[test]
    fn absence_threshold_is_strict() {
        let quiet = result(false, 0.0);
        assert!(kinds(&employee(5), quiet, quiet).is_empty());
        assert_eq!(kinds(&employee(6), quiet, quiet), vec![TriggerKind::HighAbsence]);
    }

    #[test]
    fn missing_absence_count_never_fires() {
        let e = EmployeeRecord::new(EmployeeId::from("E1"), "No Data");
        let quiet = result(false, 0.0);
        assert!(kinds(&e, quiet, quiet).is_empty());
    }

    #[test]
    fn payroll_uses_native_label_not_probability() {
        let e = employee(0);
        assert!(kinds(&e, result(false, 0.97), result(false, 0.0)).is_empty());
        assert_eq!(
            kinds(&e, result(true, 0.12), result(false, 0.0)),
            vec![TriggerKind::PayrollAnomaly]
        );
    }

    #[test]
    fn attrition_uses_probability_not_native_label() {
        let e = employee(0);
        assert!(kinds(&e, result(false, 0.0), result(true, 0.6)).is_empty());
        assert_eq!(
            kinds(&e, result(false, 0.0), result(false, 0.9)),
            vec![TriggerKind::HighAttritionRisk]
        );
    }

    #[test]
    fn all_three_conditions_yield_three_distinct_events() {
        let e = employee(9);
        let features = FeatureExtractor::extract(&e);
        let triggers = TriggerEngine::default().evaluate(&e, &features, &result(true, 0.7), &result(true, 0.934));

        assert_eq!(triggers.len(), 3);
        assert_eq!(triggers[0].message, "Employee Employee 7 (E107) shows 93.4% chance of leaving.");
        assert_eq!(triggers[1].message, "Payroll irregularity detected for Employee 7 (E107).");
        assert_eq!(triggers[2].message, "Employee 7 (E107) has 9 absences.");
        assert!(triggers.iter().all(|t| t.employee_id == Some(EmployeeId::from("E107"))));
    }

    #[test]
    fn custom_thresholds_apply() {
        let engine = TriggerEngine::new(TriggerThresholds {
            attrition_probability: 0.5,
            absence_count: 2,
        });
        let e = employee(3);
        let features = FeatureExtractor::extract(&e);
        let triggers = engine.evaluate(&e, &features, &result(false, 0.0), &result(false, 0.55));
        assert_eq!(triggers.len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Property: each condition contributes exactly one event on its own.
        #[test]
        fn event_count_equals_satisfied_conditions(
            probability in 0.0f64..=1.0,
            native in any::<bool>(),
            absences in 0u32..20,
        ) {
            let e = employee(absences);
            let expected = usize::from(probability > 0.8) + usize::from(native) + usize::from(absences > 5);
            prop_assert_eq!(kinds(&e, result(native, 0.3), result(false, probability)).len(), expected);
        }
    }
}
