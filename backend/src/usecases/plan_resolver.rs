use std::sync::Arc;
use std::time::Duration;

use domain::{
    repositories::{app_users::AppUserRepository, subscriptions::SubscriptionRepository},
    value_objects::plans::PlanTier,
};
use tokio::time::timeout;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::usecases::usage::UsageError;

/// Resolves the effective tier for a user: active subscription or free
/// fallback. Missing profile rows and unreachable backends fail toward the
/// restrictive side; they never resolve to a permissive tier.
pub struct PlanResolver<A, S>
where
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    app_user_repo: Arc<A>,
    subscription_repo: Arc<S>,
    backend_timeout: Duration,
}

impl<A, S> PlanResolver<A, S>
where
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(app_user_repo: Arc<A>, subscription_repo: Arc<S>, backend_timeout: Duration) -> Self {
        Self {
            app_user_repo,
            subscription_repo,
            backend_timeout,
        }
    }

    pub async fn resolve_effective_tier(&self, user_id: Uuid) -> Result<PlanTier, UsageError> {
        let user = timeout(self.backend_timeout, self.app_user_repo.find_by_id(user_id))
            .await
            .map_err(|_| {
                error!(%user_id, "plan_resolver: profile lookup timed out");
                UsageError::BackendUnavailable
            })?
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_resolver: profile lookup failed");
                UsageError::BackendUnavailable
            })?;

        if user.is_none() {
            warn!(%user_id, "plan_resolver: no profile record for user");
            return Err(UsageError::UserNotFound);
        }

        let subscription = timeout(
            self.backend_timeout,
            self.subscription_repo.find_current_active_subscription(user_id),
        )
        .await
        .map_err(|_| {
            error!(%user_id, "plan_resolver: subscription lookup timed out");
            UsageError::BackendUnavailable
        })?
        .map_err(|err| {
            error!(%user_id, db_error = ?err, "plan_resolver: subscription lookup failed");
            UsageError::BackendUnavailable
        })?;

        match subscription {
            Some(subscription) => match PlanTier::from_str(&subscription.tier) {
                Some(tier) => {
                    debug!(%user_id, %tier, "plan_resolver: using active subscription tier");
                    Ok(tier)
                }
                None => {
                    // Unknown stored tier reads as the most restrictive plan.
                    warn!(
                        %user_id,
                        stored_tier = subscription.tier,
                        "plan_resolver: unknown tier on subscription row, treating as free"
                    );
                    Ok(PlanTier::Free)
                }
            },
            None => {
                debug!(%user_id, "plan_resolver: no active subscription, falling back to free");
                Ok(PlanTier::Free)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use domain::{
        entities::{app_users::AppUserEntity, subscriptions::SubscriptionEntity},
        repositories::{
            app_users::MockAppUserRepository, subscriptions::MockSubscriptionRepository,
        },
    };
    use mockall::predicate::eq;

    const BACKEND_TIMEOUT: Duration = Duration::from_secs(3);

    fn sample_user(id: Uuid) -> AppUserEntity {
        let now = Utc::now();
        AppUserEntity {
            id,
            email: Some("user@example.com".to_string()),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_subscription(user_id: Uuid, tier: &str) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            tier: tier.to_string(),
            billing_interval: "monthly".to_string(),
            starts_at: now - ChronoDuration::days(1),
            ends_at: now + ChronoDuration::days(29),
            cancel_at_period_end: false,
            canceled_at: None,
            provider_subscription_id: Some("sub_123".to_string()),
            status: "active".to_string(),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn returns_subscription_tier_when_active() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();

        let user = sample_user(user_id);
        app_user_repo
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });

        let subscription = sample_subscription(user_id, "pro");
        subscription_repo
            .expect_find_current_active_subscription()
            .with(eq(user_id))
            .returning(move |_| {
                let subscription = subscription.clone();
                Box::pin(async move { Ok(Some(subscription)) })
            });

        let resolver = PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::new(subscription_repo),
            BACKEND_TIMEOUT,
        );

        let tier = resolver.resolve_effective_tier(user_id).await.unwrap();
        assert_eq!(tier, PlanTier::Pro);
    }

    #[tokio::test]
    async fn falls_back_to_free_without_active_subscription() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();

        let user = sample_user(user_id);
        app_user_repo.expect_find_by_id().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });
        subscription_repo
            .expect_find_current_active_subscription()
            .returning(|_| Box::pin(async { Ok(None) }));

        let resolver = PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::new(subscription_repo),
            BACKEND_TIMEOUT,
        );

        let tier = resolver.resolve_effective_tier(user_id).await.unwrap();
        assert_eq!(tier, PlanTier::Free);
    }

    #[tokio::test]
    async fn unknown_stored_tier_degrades_to_free() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();

        let user = sample_user(user_id);
        app_user_repo.expect_find_by_id().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let subscription = sample_subscription(user_id, "enterprise");
        subscription_repo
            .expect_find_current_active_subscription()
            .returning(move |_| {
                let subscription = subscription.clone();
                Box::pin(async move { Ok(Some(subscription)) })
            });

        let resolver = PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::new(subscription_repo),
            BACKEND_TIMEOUT,
        );

        let tier = resolver.resolve_effective_tier(user_id).await.unwrap();
        assert_eq!(tier, PlanTier::Free);
    }

    #[tokio::test]
    async fn missing_profile_is_a_denial() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        let subscription_repo = MockSubscriptionRepository::new();

        app_user_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let resolver = PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::new(subscription_repo),
            BACKEND_TIMEOUT,
        );

        let err = resolver.resolve_effective_tier(user_id).await.unwrap_err();
        assert!(matches!(err, UsageError::UserNotFound));
    }

    #[tokio::test]
    async fn backend_failure_never_defaults_to_a_tier() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        let subscription_repo = MockSubscriptionRepository::new();

        app_user_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection refused")) }));

        let resolver = PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::new(subscription_repo),
            BACKEND_TIMEOUT,
        );

        let err = resolver.resolve_effective_tier(user_id).await.unwrap_err();
        assert!(matches!(err, UsageError::BackendUnavailable));
    }
}
