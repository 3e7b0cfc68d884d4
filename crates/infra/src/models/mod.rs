//! Risk-model persistence and provisioning.
//!
//! - `ModelStore`: load/save contract for trained models (file or memory).
//! - `provision_model`: load-or-train at startup and on forced retrain.
//! - `SharedRiskModel`: the process-wide handle request handlers read from.

use std::sync::Arc;

use thiserror::Error;

use hris_ai::{AiError, RiskModel, RiskModelKind};

pub mod file;
pub mod in_memory;
pub mod provision;
pub mod shared;

pub use file::FileModelStore;
pub use in_memory::InMemoryModelStore;
pub use provision::{ModelOrigin, ProvisionReport, Provisioned, provision_model};
pub use shared::SharedRiskModel;

#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("no persisted {0} model")]
    NotFound(RiskModelKind),

    #[error("model artifact io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact could not be decoded: {0}")]
    Serde(String),

    #[error("model artifact does not match this build: {0}")]
    SchemaMismatch(String),

    #[error("model store unavailable: {0}")]
    Unavailable(String),
}

impl From<AiError> for ModelStoreError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Encoding(e) => ModelStoreError::Serde(e.to_string()),
            AiError::MalformedModel(msg) => ModelStoreError::SchemaMismatch(msg),
            AiError::InvalidInput(msg) => ModelStoreError::Unavailable(msg),
        }
    }
}

/// Persistence for trained risk models.
///
/// A saved-then-loaded model must classify identically to the one saved.
pub trait ModelStore: Send + Sync {
    fn load(&self, kind: RiskModelKind) -> Result<RiskModel, ModelStoreError>;

    fn save(&self, model: &RiskModel) -> Result<(), ModelStoreError>;
}

impl<S> ModelStore for Arc<S>
where
    S: ModelStore + ?Sized,
{
    fn load(&self, kind: RiskModelKind) -> Result<RiskModel, ModelStoreError> {
        (**self).load(kind)
    }

    fn save(&self, model: &RiskModel) -> Result<(), ModelStoreError> {
        (**self).save(model)
    }
}
