use std::sync::Arc;
use std::time::Duration;

use domain::{
    repositories::{
        app_users::AppUserRepository, subscriptions::SubscriptionRepository,
        usage_counts::UsageCountsRepository,
    },
    value_objects::usage::UsageSummary,
};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error};
use uuid::Uuid;

use crate::usecases::{plan_resolver::PlanResolver, usage_cache::UsageCache};

#[derive(Debug, Error)]
pub enum UsageError {
    /// Transient; the caller should retry. Never grants access.
    #[error("usage backend unavailable, try again")]
    BackendUnavailable,
    /// Treated as a denial, not as an empty usage record.
    #[error("user profile not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UsageError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UsageError::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            UsageError::UserNotFound => StatusCode::NOT_FOUND,
            UsageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Usage aggregator behind the TTL cache: pairs backing-store counts with
/// the effective tier's ceilings.
///
/// Concurrent cache misses for one user may each fetch from the backend;
/// correctness relies on invalidation after writes, not on single-flight
/// de-duplication.
pub struct UsageUseCase<C, A, S>
where
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    counts_repo: Arc<C>,
    plan_resolver: Arc<PlanResolver<A, S>>,
    cache: Arc<UsageCache>,
    backend_timeout: Duration,
}

impl<C, A, S> UsageUseCase<C, A, S>
where
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(
        counts_repo: Arc<C>,
        plan_resolver: Arc<PlanResolver<A, S>>,
        cache: Arc<UsageCache>,
        backend_timeout: Duration,
    ) -> Self {
        Self {
            counts_repo,
            plan_resolver,
            cache,
            backend_timeout,
        }
    }

    pub async fn get_user_usage(&self, user_id: Uuid) -> Result<UsageSummary, UsageError> {
        if let Some(summary) = self.cache.get(user_id).await {
            debug!(%user_id, "usage: serving summary from cache");
            return Ok(summary);
        }

        let summary = self.fetch_usage(user_id).await?;
        self.cache.insert(user_id, summary).await;

        Ok(summary)
    }

    /// Must run after every successful write that changes a counted resource
    /// and after every applied plan change, before control returns to the
    /// caller.
    pub async fn invalidate(&self, user_id: Uuid) {
        self.cache.invalidate(user_id).await;
        debug!(%user_id, "usage: cache entry invalidated");
    }

    async fn fetch_usage(&self, user_id: Uuid) -> Result<UsageSummary, UsageError> {
        let tier = self.plan_resolver.resolve_effective_tier(user_id).await?;

        let counts = timeout(self.backend_timeout, self.counts_repo.fetch_counts(user_id))
            .await
            .map_err(|_| {
                error!(%user_id, "usage: counts query timed out");
                UsageError::BackendUnavailable
            })?
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "usage: counts query failed");
                UsageError::BackendUnavailable
            })?;

        debug!(%user_id, %tier, "usage: summary computed from backing store");
        Ok(UsageSummary::from_counts(tier, counts))
    }
}
