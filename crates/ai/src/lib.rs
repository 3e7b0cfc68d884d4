//! `hris-ai`
//!
//! **Responsibility:** risk scoring for employee records.
//!
//! - `features`: fixed 4-feature encoding of an employee record.
//! - `forest`: deterministic random-forest binary classifier.
//! - `labels`: ground-truth labeling rules and fallback training tables.
//! - `model`: payroll-anomaly and attrition risk models + persisted artifact.
//! - `trigger_rules`: decides which trigger events a scored employee raises.
//!
//! Nothing here performs IO or mutates records; persistence and trigger
//! storage live in `hris-infra`.

pub mod features;
pub mod forest;
pub mod labels;
pub mod model;
pub mod result;
pub mod trigger_rules;

pub use features::{FEATURE_COUNT, FEATURE_SCHEMA, FeatureExtractor, FeatureVector};
pub use forest::{BinaryClassifier, DecisionTree, ForestParams, RandomForest};
pub use labels::{TrainingRow, TrainingSet, TrainingSource};
pub use model::{
    ClassificationResult, DECISION_THRESHOLD, ModelArtifact, ModelMetadata, RiskModel, RiskModelKind,
};
pub use result::AiError;
pub use trigger_rules::{TriggerEngine, TriggerThresholds};
