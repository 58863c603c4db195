use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use domain::value_objects::snippets::{CreateSnippetModel, ListSnippetsFilter, UpdateSnippetModel};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgSnippetUseCase;
use crate::usecases::snippets::SnippetError;

pub fn routes(snippet_usecase: Arc<PgSnippetUseCase>) -> Router {
    Router::new()
        .route("/", post(create_snippet).get(list_snippets))
        .route(
            "/:snippet_id",
            get(get_snippet).put(update_snippet).delete(delete_snippet),
        )
        .with_state(snippet_usecase)
}

fn error_response(err: SnippetError) -> Response {
    match &err {
        SnippetError::Admission(admission) => {
            respond_error(err.status_code(), admission.user_message())
        }
        _ => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn create_snippet(
    State(snippet_usecase): State<Arc<PgSnippetUseCase>>,
    auth: AuthUser,
    Json(model): Json<CreateSnippetModel>,
) -> Response {
    match snippet_usecase.create_snippet(auth.user_id, model).await {
        Ok(snippet) => (StatusCode::CREATED, Json(snippet)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_snippets(
    State(snippet_usecase): State<Arc<PgSnippetUseCase>>,
    auth: AuthUser,
    Query(filter): Query<ListSnippetsFilter>,
) -> Response {
    match snippet_usecase.list_snippets(auth.user_id, filter).await {
        Ok(snippets) => Json(snippets).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get_snippet(
    State(snippet_usecase): State<Arc<PgSnippetUseCase>>,
    auth: AuthUser,
    Path(snippet_id): Path<Uuid>,
) -> Response {
    match snippet_usecase.get_snippet(auth.user_id, snippet_id).await {
        Ok(snippet) => Json(snippet).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn update_snippet(
    State(snippet_usecase): State<Arc<PgSnippetUseCase>>,
    auth: AuthUser,
    Path(snippet_id): Path<Uuid>,
    Json(model): Json<UpdateSnippetModel>,
) -> Response {
    match snippet_usecase
        .update_snippet(auth.user_id, snippet_id, model)
        .await
    {
        Ok(snippet) => Json(snippet).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn delete_snippet(
    State(snippet_usecase): State<Arc<PgSnippetUseCase>>,
    auth: AuthUser,
    Path(snippet_id): Path<Uuid>,
) -> Response {
    match snippet_usecase.delete_snippet(auth.user_id, snippet_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
