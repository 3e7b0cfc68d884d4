use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use hris_infra::DashboardError;
use hris_infra::directory::DirectoryError;
use hris_infra::triggers::TriggerStoreError;

pub fn directory_error_to_response(err: DirectoryError) -> axum::response::Response {
    match err {
        DirectoryError::NotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("employee {id} not found"))
        }
        DirectoryError::Duplicate(key) => json_error(StatusCode::CONFLICT, "conflict", key),
        DirectoryError::Storage(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "directory_error", msg),
    }
}

pub fn trigger_error_to_response(err: TriggerStoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "trigger_store_error", err.to_string())
}

pub fn dashboard_error_to_response(err: DashboardError) -> axum::response::Response {
    match err {
        DashboardError::Directory(e) => directory_error_to_response(e),
        DashboardError::Trigger(e) => trigger_error_to_response(e),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
