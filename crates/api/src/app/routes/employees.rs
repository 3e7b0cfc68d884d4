use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
};

use hris_core::EmployeeId;
use hris_infra::directory::{AttendanceLog, EmployeeStore, PayrollLedger};

use crate::app::{dto::EmployeeDetail, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_employees))
        .route("/:id", get(get_employee))
}

/// GET /employees
pub async fn list_employees(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match EmployeeStore::list_all(&*services.directory) {
        Ok(employees) => Json(employees).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}

/// GET /employees/:id
pub async fn get_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = EmployeeId::from(id.as_str());
    let directory = &*services.directory;

    let detail = EmployeeStore::get_by_id(directory, &id).and_then(|employee| {
        Ok(EmployeeDetail {
            payrolls: PayrollLedger::list_for_employee(directory, &id)?,
            attendance: AttendanceLog::list_for_employee(directory, &id)?,
            employee,
        })
    });

    match detail {
        Ok(d) => Json(d).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}
