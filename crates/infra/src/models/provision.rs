use serde::Serialize;
use tracing::{info, warn};

use hris_ai::{AiError, ForestParams, ModelMetadata, RiskModel, RiskModelKind, TrainingSet};
use hris_workforce::EmployeeRecord;

use super::{ModelStore, ModelStoreError};

/// How a served model came to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrigin {
    /// Read back from the model store.
    Loaded,
    /// Freshly trained and persisted.
    Trained,
    /// Freshly trained; persisting failed, so it lives only in this process.
    TrainedUnsaved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionReport {
    pub kind: RiskModelKind,
    pub origin: ModelOrigin,
    pub metadata: Option<ModelMetadata>,
}

#[derive(Debug, Clone)]
pub struct Provisioned {
    pub model: RiskModel,
    pub report: ProvisionReport,
}

/// Load a persisted model, or train and persist a new one.
///
/// Unless `force` is set a loadable artifact wins. A missing, corrupt or
/// mismatched artifact falls through to training; that is never an error.
/// Training uses the live population, or the fallback table when it is too
/// small. A failed save is logged and the trained model is still returned.
pub fn provision_model<S>(
    kind: RiskModelKind,
    store: &S,
    employees: &[EmployeeRecord],
    force: bool,
) -> Result<Provisioned, AiError>
where
    S: ModelStore + ?Sized,
{
    if !force {
        match store.load(kind) {
            Ok(model) => {
                info!(kind = %kind, "loaded persisted risk model");
                let report = ProvisionReport {
                    kind,
                    origin: ModelOrigin::Loaded,
                    metadata: model.metadata().cloned(),
                };
                return Ok(Provisioned { model, report });
            }
            Err(ModelStoreError::NotFound(_)) => {
                info!(kind = %kind, "no persisted risk model; training");
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "persisted risk model unusable; retraining");
            }
        }
    }

    let set = TrainingSet::from_employees(kind, employees);
    let model = RiskModel::train(&set, ForestParams::default())?;

    let origin = match store.save(&model) {
        Ok(()) => ModelOrigin::Trained,
        Err(e) => {
            warn!(kind = %kind, error = %e, "failed to persist trained risk model; serving it from memory");
            ModelOrigin::TrainedUnsaved
        }
    };

    info!(
        kind = %kind,
        rows = set.len(),
        positives = set.positives(),
        source = ?set.source,
        forced = force,
        "trained risk model"
    );

    let report = ProvisionReport {
        kind,
        origin,
        metadata: model.metadata().cloned(),
    };
    Ok(Provisioned { model, report })
}
