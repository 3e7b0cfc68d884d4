use axum::body::Bytes;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use hris_ai::{FeatureVector, RiskModelKind};
use hris_infra::models::ProvisionReport;
use hris_workforce::{AttendanceRecord, EmployeeRecord, PayrollRecord, lenient};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Raw feature values for an ad-hoc prediction; every field is optional.
///
/// Numbers decode leniently (`45000.0`, `"3"`); negative values score as 0.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub tenure: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub salary: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub perf_score: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub absence: Option<i64>,
}

impl PredictRequest {
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(
            saturate(self.tenure, 0, u32::MAX),
            saturate(self.salary, 30_000, u64::MAX),
            saturate(self.perf_score, 1, u8::MAX),
            saturate(self.absence, 0, u32::MAX),
        )
    }
}

/// Clamp into the unsigned feature range.
fn saturate<T: TryFrom<i64>>(value: Option<i64>, default: T, max: T) -> T {
    match value {
        None => default,
        Some(v) => T::try_from(v.max(0)).unwrap_or(max),
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrainTarget {
    Payroll,
    Attrition,
    #[default]
    Both,
}

impl RetrainTarget {
    pub fn kinds(self) -> Vec<RiskModelKind> {
        match self {
            RetrainTarget::Payroll => vec![RiskModelKind::Payroll],
            RetrainTarget::Attrition => vec![RiskModelKind::Attrition],
            RetrainTarget::Both => RiskModelKind::all().to_vec(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RetrainRequest {
    #[serde(default)]
    pub model: RetrainTarget,
}

#[derive(Debug, Deserialize)]
pub struct TriggersQuery {
    pub limit: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub risk: bool,
    pub probability: f64,
}

#[derive(Debug, Serialize)]
pub struct AttritionPredictResponse {
    pub attrition_risk: bool,
    pub probability: f64,
}

#[derive(Debug, Serialize)]
pub struct EmployeeDetail {
    pub employee: EmployeeRecord,
    pub payrolls: Vec<PayrollRecord>,
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize)]
pub struct RetrainResponse {
    pub retrained: Vec<ProvisionReport>,
}

// -------------------------
// Helpers
// -------------------------

/// Decode an optional JSON body: an empty body means "all defaults".
pub fn parse_json_body<T>(body: &Bytes) -> Result<T, axum::response::Response>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()))
}
