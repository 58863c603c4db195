use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use domain::value_objects::animations::{CreateAnimationModel, UpdateAnimationModel};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgAnimationUseCase;
use crate::usecases::animations::AnimationError;

pub fn routes(animation_usecase: Arc<PgAnimationUseCase>) -> Router {
    Router::new()
        .route("/", post(create_animation).get(list_animations))
        .route(
            "/:animation_id",
            get(get_animation)
                .put(update_animation)
                .delete(delete_animation),
        )
        .with_state(animation_usecase)
}

fn error_response(err: AnimationError) -> Response {
    match &err {
        AnimationError::Admission(admission) => {
            respond_error(err.status_code(), admission.user_message())
        }
        _ => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn create_animation(
    State(animation_usecase): State<Arc<PgAnimationUseCase>>,
    auth: AuthUser,
    Json(model): Json<CreateAnimationModel>,
) -> Response {
    match animation_usecase.create_animation(auth.user_id, model).await {
        Ok(animation) => (StatusCode::CREATED, Json(animation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_animations(
    State(animation_usecase): State<Arc<PgAnimationUseCase>>,
    auth: AuthUser,
) -> Response {
    match animation_usecase.list_animations(auth.user_id).await {
        Ok(animations) => Json(animations).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get_animation(
    State(animation_usecase): State<Arc<PgAnimationUseCase>>,
    auth: AuthUser,
    Path(animation_id): Path<Uuid>,
) -> Response {
    match animation_usecase.get_animation(auth.user_id, animation_id).await {
        Ok(animation) => Json(animation).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn update_animation(
    State(animation_usecase): State<Arc<PgAnimationUseCase>>,
    auth: AuthUser,
    Path(animation_id): Path<Uuid>,
    Json(model): Json<UpdateAnimationModel>,
) -> Response {
    match animation_usecase
        .update_animation(auth.user_id, animation_id, model)
        .await
    {
        Ok(animation) => Json(animation).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn delete_animation(
    State(animation_usecase): State<Arc<PgAnimationUseCase>>,
    auth: AuthUser,
    Path(animation_id): Path<Uuid>,
) -> Response {
    match animation_usecase
        .delete_animation(auth.user_id, animation_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
