use std::collections::HashMap;
use std::sync::RwLock;

use hris_ai::{ModelArtifact, RiskModel, RiskModelKind};

use super::{ModelStore, ModelStoreError};

/// In-memory model store for tests/dev.
///
/// Keeps encoded artifacts, so loads go through the same codec as files.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    artifacts: RwLock<HashMap<RiskModelKind, Vec<u8>>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `kind`, bypassing encoding.
    pub fn put_raw(&self, kind: RiskModelKind, bytes: Vec<u8>) {
        if let Ok(mut map) = self.artifacts.write() {
            map.insert(kind, bytes);
        }
    }

    pub fn contains(&self, kind: RiskModelKind) -> bool {
        self.artifacts
            .read()
            .map(|map| map.contains_key(&kind))
            .unwrap_or(false)
    }
}

impl ModelStore for InMemoryModelStore {
    fn load(&self, kind: RiskModelKind) -> Result<RiskModel, ModelStoreError> {
        let bytes = {
            let map = self
                .artifacts
                .read()
                .map_err(|_| ModelStoreError::Unavailable("lock poisoned".to_string()))?;
            map.get(&kind).cloned().ok_or(ModelStoreError::NotFound(kind))?
        };
        let artifact = ModelArtifact::decode(&bytes)?;
        Ok(RiskModel::from_artifact(artifact, kind)?)
    }

    fn save(&self, model: &RiskModel) -> Result<(), ModelStoreError> {
        let bytes = model.to_artifact()?.encode()?;
        let mut map = self
            .artifacts
            .write()
            .map_err(|_| ModelStoreError::Unavailable("lock poisoned".to_string()))?;
        map.insert(model.kind(), bytes);
        Ok(())
    }
}
