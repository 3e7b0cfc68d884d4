use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hris_ai::{ModelArtifact, RiskModel, RiskModelKind};

use super::{ModelStore, ModelStoreError};

/// JSON artifacts in a directory, one file per model kind.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
    payroll_file: String,
    attrition_file: String,
}

impl FileModelStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        payroll_file: impl Into<String>,
        attrition_file: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            payroll_file: payroll_file.into(),
            attrition_file: attrition_file.into(),
        }
    }

    pub fn path_for(&self, kind: RiskModelKind) -> PathBuf {
        match kind {
            RiskModelKind::Payroll => self.dir.join(&self.payroll_file),
            RiskModelKind::Attrition => self.dir.join(&self.attrition_file),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ModelStore for FileModelStore {
    fn load(&self, kind: RiskModelKind) -> Result<RiskModel, ModelStoreError> {
        let path = self.path_for(kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ModelStoreError::NotFound(kind)),
            Err(e) => return Err(e.into()),
        };
        let artifact = ModelArtifact::decode(&bytes)?;
        Ok(RiskModel::from_artifact(artifact, kind)?)
    }

    /// Write to a sibling temp file, then rename over the target so a crash
    /// never leaves a truncated artifact behind.
    fn save(&self, model: &RiskModel) -> Result<(), ModelStoreError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = model.to_artifact()?.encode()?;

        let path = self.path_for(model.kind());
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hris_ai::{FeatureVector, ForestParams, TrainingSet};

    fn store(dir: &Path) -> FileModelStore {
        FileModelStore::new(dir.join("ml_models"), "payroll_risk_model.json", "attrition_model.json")
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            store(tmp.path()).load(RiskModelKind::Payroll),
            Err(ModelStoreError::NotFound(RiskModelKind::Payroll))
        ));
    }

    #[test]
    fn saved_model_reloads_and_classifies_identically() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let model = RiskModel::train(&TrainingSet::fallback(RiskModelKind::Attrition), ForestParams::default()).unwrap();

        store.save(&model).unwrap();
        assert!(tmp.path().join("ml_models/attrition_model.json").exists());

        let reloaded = store.load(RiskModelKind::Attrition).unwrap();
        let probe = FeatureVector::new(1, 33_000, 1, 5);
        assert_eq!(model.classify(&probe), reloaded.classify(&probe));
        assert_eq!(model.metadata(), reloaded.metadata());
    }

    #[test]
    fn corrupt_file_fails_to_decode() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_for(RiskModelKind::Payroll), b"{\"format_version\": 1").unwrap();

        assert!(matches!(
            store.load(RiskModelKind::Payroll),
            Err(ModelStoreError::Serde(_))
        ));
    }

    #[test]
    fn artifact_saved_under_the_wrong_name_is_a_schema_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let payroll = RiskModel::train(&TrainingSet::fallback(RiskModelKind::Payroll), ForestParams::default()).unwrap();
        store.save(&payroll).unwrap();
        fs::copy(
            store.path_for(RiskModelKind::Payroll),
            store.path_for(RiskModelKind::Attrition),
        )
        .unwrap();

        assert!(matches!(
            store.load(RiskModelKind::Attrition),
            Err(ModelStoreError::SchemaMismatch(_))
        ));
    }
}
