use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use domain::value_objects::usage::UsageSummaryDto;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgUsageUseCase;

pub fn routes(usage_usecase: Arc<PgUsageUseCase>) -> Router {
    Router::new()
        .route("/", get(get_usage))
        .with_state(usage_usecase)
}

/// Account-page meter: counts, ceilings, and percentages per resource.
pub async fn get_usage(
    State(usage_usecase): State<Arc<PgUsageUseCase>>,
    auth: AuthUser,
) -> Response {
    match usage_usecase.get_user_usage(auth.user_id).await {
        Ok(summary) => Json(UsageSummaryDto::from(summary)).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}
