use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};

use hris_infra::triggers::{DEFAULT_RECENT_LIMIT, TriggerStore};

use crate::app::{dto::TriggersQuery, errors, services::AppServices};

/// GET /triggers?limit=N - newest first.
pub async fn recent(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<TriggersQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    match services.triggers.recent(limit) {
        Ok(events) => Json(events).into_response(),
        Err(e) => errors::trigger_error_to_response(e),
    }
}
