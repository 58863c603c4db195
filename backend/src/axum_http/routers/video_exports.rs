use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use domain::value_objects::video_exports::RecordExportModel;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgVideoExportUseCase;
use crate::usecases::video_exports::VideoExportError;

pub fn routes(video_export_usecase: Arc<PgVideoExportUseCase>) -> Router {
    Router::new()
        .route("/", post(record_export).get(list_exports))
        .with_state(video_export_usecase)
}

fn error_response(err: VideoExportError) -> Response {
    match &err {
        VideoExportError::Admission(admission) => {
            respond_error(err.status_code(), admission.user_message())
        }
        _ => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn record_export(
    State(video_export_usecase): State<Arc<PgVideoExportUseCase>>,
    auth: AuthUser,
    Json(model): Json<RecordExportModel>,
) -> Response {
    match video_export_usecase.record_export(auth.user_id, model).await {
        Ok(export) => (StatusCode::CREATED, Json(export)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_exports(
    State(video_export_usecase): State<Arc<PgVideoExportUseCase>>,
    auth: AuthUser,
) -> Response {
    match video_export_usecase.list_exports(auth.user_id).await {
        Ok(exports) => Json(exports).into_response(),
        Err(err) => error_response(err),
    }
}
