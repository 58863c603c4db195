use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use domain::value_objects::shares::PublishShareModel;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgShareUseCase;
use crate::usecases::shares::ShareError;

pub fn routes(share_usecase: Arc<PgShareUseCase>) -> Router {
    Router::new()
        .route("/", post(publish_snippet))
        .route("/:snippet_id", delete(unpublish_snippet))
        // Public share page lookup; deliberately unauthenticated.
        .route("/public/:slug", get(resolve_share))
        .with_state(share_usecase)
}

fn error_response(err: ShareError) -> Response {
    match &err {
        ShareError::Admission(admission) => {
            respond_error(err.status_code(), admission.user_message())
        }
        _ => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn publish_snippet(
    State(share_usecase): State<Arc<PgShareUseCase>>,
    auth: AuthUser,
    Json(model): Json<PublishShareModel>,
) -> Response {
    match share_usecase.publish_snippet(auth.user_id, model).await {
        Ok(share) => (StatusCode::CREATED, Json(share)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn unpublish_snippet(
    State(share_usecase): State<Arc<PgShareUseCase>>,
    auth: AuthUser,
    Path(snippet_id): Path<Uuid>,
) -> Response {
    match share_usecase.unpublish_snippet(auth.user_id, snippet_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn resolve_share(
    State(share_usecase): State<Arc<PgShareUseCase>>,
    Path(slug): Path<String>,
) -> Response {
    match share_usecase.resolve_share(&slug).await {
        Ok(snippet) => Json(snippet).into_response(),
        Err(err) => error_response(err),
    }
}
