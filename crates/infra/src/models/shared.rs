use std::sync::{Arc, RwLock};

use hris_ai::{BinaryClassifier, RandomForest, RiskModel};

/// Process-wide handle to the model currently being served.
///
/// Readers take a cheap `Arc` snapshot and classify without holding the lock.
/// Retraining builds a new model and swaps it in; a live model is never
/// mutated.
#[derive(Debug)]
pub struct SharedRiskModel<C = RandomForest> {
    current: RwLock<Arc<RiskModel<C>>>,
}

impl<C: BinaryClassifier> SharedRiskModel<C> {
    pub fn new(model: RiskModel<C>) -> Self {
        Self {
            current: RwLock::new(Arc::new(model)),
        }
    }

    pub fn current(&self) -> Arc<RiskModel<C>> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically swap in `model`, returning the one it replaced.
    pub fn replace(&self, model: RiskModel<C>) -> Arc<RiskModel<C>> {
        let next = Arc::new(model);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hris_ai::{FEATURE_COUNT, FeatureVector, RiskModelKind};

    struct Constant(f64);

    impl BinaryClassifier for Constant {
        fn predict(&self, _x: &[f64; FEATURE_COUNT]) -> bool {
            self.0 > 0.5
        }

        fn predict_probability(&self, _x: &[f64; FEATURE_COUNT]) -> f64 {
            self.0
        }
    }

    #[test]
    fn snapshots_survive_a_swap() {
        let shared = SharedRiskModel::new(RiskModel::from_classifier(RiskModelKind::Attrition, Constant(0.2)));
        let before = shared.current();

        let old = shared.replace(RiskModel::from_classifier(RiskModelKind::Attrition, Constant(0.9)));
        let probe = FeatureVector::new(1, 30_000, 1, 0);

        assert_eq!(before.classify(&probe).probability, 0.2);
        assert_eq!(old.classify(&probe).probability, 0.2);
        assert_eq!(shared.current().classify(&probe).probability, 0.9);
    }
}
