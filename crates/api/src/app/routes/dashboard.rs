use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{errors, services::AppServices};

/// GET /hr/dashboard
///
/// Every load re-evaluates all employees and appends the triggers they raise.
pub async fn snapshot(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    // Scoring and trigger-log writes block.
    match tokio::task::spawn_blocking(move || services.dashboard_snapshot()).await {
        Ok(Ok(snapshot)) => Json(snapshot).into_response(),
        Ok(Err(e)) => errors::dashboard_error_to_response(e),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", e.to_string()),
    }
}
