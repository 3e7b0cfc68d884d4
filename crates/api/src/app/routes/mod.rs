use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod dashboard;
pub mod employees;
pub mod predict;
pub mod system;
pub mod triggers;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/stream", get(system::stream))
        .route("/api/predict", post(predict::payroll))
        .route("/api/attrition_predict", post(predict::attrition))
        .route("/hr/dashboard", get(dashboard::snapshot))
        .nest("/employees", employees::router())
        .route("/triggers", get(triggers::recent))
        .nest("/admin", admin::router())
}
