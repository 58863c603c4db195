use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use infra::{
    payments::stripe_client::StripeClient,
    postgres::{
        postgres_connection::PgPool,
        repositories::{
            animations::AnimationPostgres, app_users::AppUserPostgres, folders::FolderPostgres,
            payment_provider_customers::PaymentProviderCustomerPostgres, shares::SharePostgres,
            snippets::SnippetPostgres, subscriptions::SubscriptionPostgres,
            usage_counts::UsageCountsPostgres, video_exports::VideoExportPostgres,
        },
    },
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::{
        animations::AnimationUseCase, folders::FolderUseCase, plan_resolver::PlanResolver,
        shares::ShareUseCase, snippets::SnippetUseCase, subscriptions::SubscriptionUseCase,
        usage::UsageUseCase, usage_cache::UsageCache, video_exports::VideoExportUseCase,
    },
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPool>) -> Result<()> {
    let app_user_repo = Arc::new(AppUserPostgres::new(Arc::clone(&db_pool)));
    let subscription_repo = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let counts_repo = Arc::new(UsageCountsPostgres::new(Arc::clone(&db_pool)));
    let snippet_repo = Arc::new(SnippetPostgres::new(Arc::clone(&db_pool)));
    let folder_repo = Arc::new(FolderPostgres::new(Arc::clone(&db_pool)));
    let animation_repo = Arc::new(AnimationPostgres::new(Arc::clone(&db_pool)));
    let video_export_repo = Arc::new(VideoExportPostgres::new(Arc::clone(&db_pool)));
    let share_repo = Arc::new(SharePostgres::new(Arc::clone(&db_pool)));
    let customer_repo = Arc::new(PaymentProviderCustomerPostgres::new(Arc::clone(&db_pool)));

    let backend_timeout = Duration::from_secs(config.usage_engine.backend_timeout_seconds);
    let plan_resolver = Arc::new(PlanResolver::new(
        Arc::clone(&app_user_repo),
        Arc::clone(&subscription_repo),
        backend_timeout,
    ));

    // One cache instance for the whole router tree: every mutating usecase
    // must invalidate the same entries the usage endpoint reads.
    let usage_cache = Arc::new(UsageCache::new(Duration::from_secs(
        config.usage_engine.cache_ttl_seconds,
    )));
    let usage_usecase = Arc::new(UsageUseCase::new(
        Arc::clone(&counts_repo),
        plan_resolver,
        usage_cache,
        backend_timeout,
    ));

    let snippet_usecase = Arc::new(SnippetUseCase::new(
        Arc::clone(&snippet_repo),
        Arc::clone(&usage_usecase),
    ));
    let folder_usecase = Arc::new(FolderUseCase::new(folder_repo, Arc::clone(&usage_usecase)));
    let animation_usecase = Arc::new(AnimationUseCase::new(
        Arc::clone(&animation_repo),
        Arc::clone(&usage_usecase),
    ));
    let video_export_usecase = Arc::new(VideoExportUseCase::new(
        video_export_repo,
        animation_repo,
        Arc::clone(&usage_usecase),
    ));
    let share_usecase = Arc::new(ShareUseCase::new(
        share_repo,
        snippet_repo,
        Arc::clone(&usage_usecase),
    ));

    let stripe_client = Arc::new(StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
        config.stripe.success_url.clone(),
        config.stripe.cancel_url.clone(),
    ));
    let subscription_usecase = Arc::new(SubscriptionUseCase::new(
        subscription_repo,
        customer_repo,
        stripe_client,
        Arc::clone(&usage_usecase),
        config.stripe.clone(),
    ));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1/snippets", routers::snippets::routes(snippet_usecase))
        .nest("/api/v1/folders", routers::folders::routes(folder_usecase))
        .nest(
            "/api/v1/animations",
            routers::animations::routes(animation_usecase),
        )
        .nest(
            "/api/v1/video-exports",
            routers::video_exports::routes(video_export_usecase),
        )
        .nest("/api/v1/shares", routers::shares::routes(share_usecase))
        .nest("/api/v1/usage", routers::usage::routes(usage_usecase))
        .nest(
            "/api/v1/subscriptions",
            routers::subscriptions::routes(subscription_usecase),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any), // TODO restrict to the app domain before GA
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
