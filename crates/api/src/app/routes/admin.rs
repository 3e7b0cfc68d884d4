//! Operator endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::{
    dto::{self, RetrainRequest, RetrainResponse},
    errors,
    services::AppServices,
};

pub fn router() -> Router {
    Router::new().route("/retrain", post(retrain))
}

/// POST /admin/retrain - force-train from the current directory and swap the
/// served model(s). An empty body retrains both.
pub async fn retrain(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> axum::response::Response {
    let req: RetrainRequest = match dto::parse_json_body(&body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    // Training is CPU-bound.
    let trained = tokio::task::spawn_blocking(move || {
        req.model
            .kinds()
            .into_iter()
            .map(|kind| services.retrain(kind))
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await;

    let retrained = match trained {
        Ok(Ok(reports)) => reports,
        Ok(Err(e)) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "training_error", format!("{e:#}"));
        }
        Err(e) => return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", e.to_string()),
    };

    Json(RetrainResponse { retrained }).into_response()
}
