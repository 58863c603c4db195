use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use domain::value_objects::{
    plans::PlanTier,
    subscriptions::{
        CreateCheckoutRequest, CreateCheckoutResponse, DowngradePreviewDto, DowngradeRequest,
    },
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::respond_error;
use crate::axum_http::routers::PgSubscriptionUseCase;
use crate::usecases::downgrade::DowngradeError;

pub fn routes(subscription_usecase: Arc<PgSubscriptionUseCase>) -> Router {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/current", get(get_current_subscription))
        .route("/checkout", post(create_checkout_session))
        .route("/cancel", post(cancel_subscription))
        .route("/downgrade/preview", get(preview_downgrade))
        .route("/downgrade", post(request_downgrade))
        .route("/webhook", post(stripe_webhook))
        .with_state(subscription_usecase)
}

fn downgrade_error_response(err: DowngradeError) -> Response {
    match err {
        // 409 carries the impact so the client can render the warning and
        // resubmit with `confirmed`.
        DowngradeError::ConfirmationRequired(impact) => {
            (StatusCode::CONFLICT, Json(DowngradePreviewDto { impact })).into_response()
        }
        err => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn list_plans(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
) -> Response {
    Json(subscription_usecase.list_plans()).into_response()
}

pub async fn get_current_subscription(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
    auth: AuthUser,
) -> Response {
    match subscription_usecase
        .get_current_subscription(auth.user_id)
        .await
    {
        Ok(subscription) => Json(subscription).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn create_checkout_session(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
    auth: AuthUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Response {
    match subscription_usecase
        .create_checkout_session(auth.user_id, auth.email, request.tier, request.billing_interval)
        .await
    {
        Ok(checkout_url) => Json(CreateCheckoutResponse { checkout_url }).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn cancel_subscription(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
    auth: AuthUser,
) -> Response {
    match subscription_usecase.cancel_subscription(auth.user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct DowngradePreviewQuery {
    pub target: Option<PlanTier>,
}

pub async fn preview_downgrade(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
    auth: AuthUser,
    Query(query): Query<DowngradePreviewQuery>,
) -> Response {
    match subscription_usecase
        .preview_downgrade(auth.user_id, query.target)
        .await
    {
        Ok(impact) => Json(DowngradePreviewDto { impact }).into_response(),
        Err(err) => downgrade_error_response(err),
    }
}

pub async fn request_downgrade(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
    auth: AuthUser,
    Json(request): Json<DowngradeRequest>,
) -> Response {
    match subscription_usecase
        .request_downgrade(auth.user_id, auth.email, request)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => downgrade_error_response(err),
    }
}

/// Billing settlement callback. Authenticated by signature, not by JWT.
pub async fn stripe_webhook(
    State(subscription_usecase): State<Arc<PgSubscriptionUseCase>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        return respond_error(StatusCode::BAD_REQUEST, "missing stripe-signature header");
    };

    match subscription_usecase
        .handle_stripe_webhook(&body, signature)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}
