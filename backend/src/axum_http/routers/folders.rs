use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use domain::value_objects::folders::{CreateFolderModel, RenameFolderModel};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgFolderUseCase;
use crate::usecases::folders::FolderError;

pub fn routes(folder_usecase: Arc<PgFolderUseCase>) -> Router {
    Router::new()
        .route("/", post(create_folder).get(list_folders))
        .route("/:folder_id", axum::routing::put(rename_folder).delete(delete_folder))
        .with_state(folder_usecase)
}

fn error_response(err: FolderError) -> Response {
    match &err {
        FolderError::Admission(admission) => {
            respond_error(err.status_code(), admission.user_message())
        }
        _ => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn create_folder(
    State(folder_usecase): State<Arc<PgFolderUseCase>>,
    auth: AuthUser,
    Json(model): Json<CreateFolderModel>,
) -> Response {
    match folder_usecase.create_folder(auth.user_id, model).await {
        Ok(folder) => (StatusCode::CREATED, Json(folder)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_folders(
    State(folder_usecase): State<Arc<PgFolderUseCase>>,
    auth: AuthUser,
) -> Response {
    match folder_usecase.list_folders(auth.user_id).await {
        Ok(folders) => Json(folders).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn rename_folder(
    State(folder_usecase): State<Arc<PgFolderUseCase>>,
    auth: AuthUser,
    Path(folder_id): Path<Uuid>,
    Json(model): Json<RenameFolderModel>,
) -> Response {
    match folder_usecase
        .rename_folder(auth.user_id, folder_id, model)
        .await
    {
        Ok(folder) => Json(folder).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn delete_folder(
    State(folder_usecase): State<Arc<PgFolderUseCase>>,
    auth: AuthUser,
    Path(folder_id): Path<Uuid>,
) -> Response {
    match folder_usecase.delete_folder(auth.user_id, folder_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
