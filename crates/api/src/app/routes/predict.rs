//! Ad-hoc scoring of raw feature values against the served models.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::Extension, response::IntoResponse};

use hris_infra::dashboard::round_to;

use crate::app::dto::{self, AttritionPredictResponse, PredictRequest, PredictResponse};
use crate::app::services::AppServices;

/// POST /api/predict
pub async fn payroll(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> axum::response::Response {
    let req: PredictRequest = match dto::parse_json_body(&body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let result = services.payroll_model.current().classify(&req.features());
    Json(PredictResponse {
        risk: result.label,
        probability: round_to(result.probability, 3),
    })
    .into_response()
}

/// POST /api/attrition_predict
pub async fn attrition(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> axum::response::Response {
    let req: PredictRequest = match dto::parse_json_body(&body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let result = services.attrition_model.current().classify(&req.features());
    Json(AttritionPredictResponse {
        attrition_risk: result.label,
        probability: round_to(result.probability, 3),
    })
    .into_response()
}
