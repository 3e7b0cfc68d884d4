//! Payroll-anomaly and attrition risk models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::{FEATURE_COUNT, FEATURE_SCHEMA, FeatureVector};
use crate::forest::{BinaryClassifier, ForestParams, RandomForest};
use crate::labels::{TrainingSet, TrainingSource};
use crate::result::AiError;

/// Probability cut used wherever a boolean flag is derived from a probability.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Bumped whenever the artifact layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskModelKind {
    Payroll,
    Attrition,
}

impl RiskModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskModelKind::Payroll => "payroll",
            RiskModelKind::Attrition => "attrition",
        }
    }

    pub fn all() -> [RiskModelKind; 2] {
        [RiskModelKind::Payroll, RiskModelKind::Attrition]
    }
}

impl core::fmt::Display for RiskModelKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one classification call. Not persisted.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The classifier's native hard label.
    pub label: bool,
    /// Probability of the positive class.
    pub probability: f64,
}

impl ClassificationResult {
    /// Flag recomputed from the probability (`> 0.5`).
    ///
    /// May differ from `label`; callers pick whichever one their rule is
    /// defined against.
    pub fn exceeds_decision_threshold(&self) -> bool {
        self.probability > DECISION_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub training_rows: usize,
    pub training_positives: usize,
    pub training_source: TrainingSource,
}

/// A trained risk model.
///
/// Immutable once built; share it behind an `Arc` and swap whole instances to
/// retrain. Generic over the classifier so tests can plug in fixed outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskModel<C = RandomForest> {
    kind: RiskModelKind,
    classifier: C,
    metadata: Option<ModelMetadata>,
}

impl<C: BinaryClassifier> RiskModel<C> {
    /// Wrap an externally built classifier (no training metadata).
    pub fn from_classifier(kind: RiskModelKind, classifier: C) -> Self {
        Self {
            kind,
            classifier,
            metadata: None,
        }
    }

    pub fn kind(&self) -> RiskModelKind {
        self.kind
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        self.classify_values(&features.values())
    }

    pub fn classify_values(&self, x: &[f64; FEATURE_COUNT]) -> ClassificationResult {
        ClassificationResult {
            label: self.classifier.predict(x),
            probability: self.classifier.predict_probability(x).clamp(0.0, 1.0),
        }
    }
}

impl RiskModel<RandomForest> {
    pub fn train(set: &TrainingSet, params: ForestParams) -> Result<Self, AiError> {
        let (rows, labels) = set.matrix();
        let forest = RandomForest::fit(&rows, &labels, params)?;

        debug!(
            kind = %set.kind,
            rows = set.len(),
            positives = set.positives(),
            source = ?set.source,
            "risk model fitted"
        );

        Ok(Self {
            kind: set.kind,
            classifier: forest,
            metadata: Some(ModelMetadata {
                trained_at: Utc::now(),
                training_rows: set.len(),
                training_positives: set.positives(),
                training_source: set.source,
            }),
        })
    }

    pub fn to_artifact(&self) -> Result<ModelArtifact, AiError> {
        let metadata = self.metadata.clone().ok_or_else(|| {
            AiError::InvalidInput("only trained models can be persisted".to_string())
        })?;
        Ok(ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind: self.kind,
            feature_schema: FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
            metadata,
            forest: self.classifier.clone(),
        })
    }

    /// Rebuild a model from an artifact, rejecting anything trained against a
    /// different layout or for the other model kind.
    pub fn from_artifact(artifact: ModelArtifact, expected: RiskModelKind) -> Result<Self, AiError> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(AiError::MalformedModel(format!(
                "artifact format {} (expected {ARTIFACT_FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        if artifact.kind != expected {
            return Err(AiError::MalformedModel(format!(
                "artifact is a {} model (expected {expected})",
                artifact.kind
            )));
        }
        if artifact.feature_schema != FEATURE_SCHEMA {
            return Err(AiError::MalformedModel(format!(
                "feature schema {:?} does not match {:?}",
                artifact.feature_schema, FEATURE_SCHEMA
            )));
        }
        artifact.forest.validate()?;

        Ok(Self {
            kind: artifact.kind,
            classifier: artifact.forest,
            metadata: Some(artifact.metadata),
        })
    }
}

/// On-disk representation of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub kind: RiskModelKind,
    pub feature_schema: Vec<String>,
    pub metadata: ModelMetadata,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn encode(&self) -> Result<Vec<u8>, AiError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, AiError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
