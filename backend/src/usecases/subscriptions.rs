use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domain::{
    entities::subscriptions::InsertSubscriptionEntity,
    repositories::{
        app_users::AppUserRepository, payment_provider_customers::PaymentProviderCustomerRepository,
        subscriptions::SubscriptionRepository, usage_counts::UsageCountsRepository,
    },
    value_objects::{
        enums::{
            billing_intervals::BillingInterval, subscription_statuses::SubscriptionStatus,
        },
        plans::{ALL_TIERS, PlanTier, plan_config},
        subscriptions::{CurrentSubscriptionDto, DowngradeOutcome, DowngradeRequest, PlanDto},
        usage::DowngradeImpact,
    },
};
use infra::payments::stripe_client::{StripeClient, StripeEvent, StripeSubscription};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::config_model::Stripe as StripeConfig;
use crate::usecases::downgrade::{DowngradeError, check_downgrade_impact};
use crate::usecases::usage::UsageUseCase;

const PAYMENT_PROVIDER: &str = "stripe";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StripeGateway: Send + Sync {
    async fn create_customer(&self, email: &str, user_id: Uuid) -> AnyResult<String>;

    async fn create_checkout_session(
        &self,
        price_id: &str,
        customer_id: Option<String>,
        metadata: HashMap<String, String>,
    ) -> AnyResult<String>;

    async fn cancel_subscription(&self, provider_subscription_id: &str) -> AnyResult<()>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;

    async fn retrieve_subscription(&self, subscription_id: &str) -> AnyResult<StripeSubscription>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_customer(&self, email: &str, user_id: Uuid) -> AnyResult<String> {
        self.create_customer(email, user_id).await
    }

    async fn create_checkout_session(
        &self,
        price_id: &str,
        customer_id: Option<String>,
        metadata: HashMap<String, String>,
    ) -> AnyResult<String> {
        self.create_checkout_session(price_id, customer_id, metadata)
            .await
    }

    async fn cancel_subscription(&self, provider_subscription_id: &str) -> AnyResult<()> {
        self.cancel_subscription(provider_subscription_id).await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> AnyResult<StripeSubscription> {
        self.retrieve_subscription(subscription_id).await
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("free plan does not require checkout")]
    FreeTierCheckout,
    #[error("missing or unconfigured plan price: {0}")]
    MissingPrice(String),
    #[error("user email is required for checkout")]
    MissingEmail,
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error("no active subscription")]
    SubscriptionNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::FreeTierCheckout
            | SubscriptionError::MissingPrice(_)
            | SubscriptionError::MissingEmail
            | SubscriptionError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::SubscriptionNotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Billing workflow around the usage engine. The local tier record moves
/// only after the corresponding Stripe settlement: checkout webhooks raise
/// it, deletion webhooks lower it, and downgrades schedule the change at
/// the provider before touching local state.
pub struct SubscriptionUseCase<C, A, S, P, G>
where
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentProviderCustomerRepository + Send + Sync + 'static,
    G: StripeGateway + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    customer_repo: Arc<P>,
    stripe_client: Arc<G>,
    usage_usecase: Arc<UsageUseCase<C, A, S>>,
    stripe_config: StripeConfig,
}

impl<C, A, S, P, G> SubscriptionUseCase<C, A, S, P, G>
where
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentProviderCustomerRepository + Send + Sync + 'static,
    G: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        customer_repo: Arc<P>,
        stripe_client: Arc<G>,
        usage_usecase: Arc<UsageUseCase<C, A, S>>,
        stripe_config: StripeConfig,
    ) -> Self {
        Self {
            subscription_repo,
            customer_repo,
            stripe_client,
            usage_usecase,
            stripe_config,
        }
    }

    pub fn list_plans(&self) -> Vec<PlanDto> {
        ALL_TIERS
            .into_iter()
            .map(|tier| PlanDto::from(plan_config(tier)))
            .collect()
    }

    pub async fn get_current_subscription(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Option<CurrentSubscriptionDto>> {
        let subscription = match self
            .subscription_repo
            .find_current_active_subscription(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load current subscription");
                SubscriptionError::Internal(err)
            })? {
            Some(subscription) => subscription,
            None => return Ok(None),
        };

        Ok(Some(CurrentSubscriptionDto {
            tier: PlanTier::from_str(&subscription.tier).unwrap_or(PlanTier::Free),
            billing_interval: BillingInterval::from_str(&subscription.billing_interval)
                .unwrap_or_default(),
            status: SubscriptionStatus::from_str(&subscription.status),
            starts_at: subscription.starts_at,
            ends_at: subscription.ends_at,
            cancel_at_period_end: subscription.cancel_at_period_end,
        }))
    }

    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        user_email: Option<String>,
        tier: PlanTier,
        interval: BillingInterval,
    ) -> UseCaseResult<String> {
        info!(
            %user_id,
            %tier,
            %interval,
            "subscriptions: create checkout session requested"
        );

        let email = user_email.ok_or_else(|| {
            let err = SubscriptionError::MissingEmail;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: missing email for checkout"
            );
            err
        })?;

        if tier == PlanTier::Free {
            let err = SubscriptionError::FreeTierCheckout;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: free plan checkout attempted"
            );
            return Err(err);
        }

        let price_id = self
            .stripe_config
            .price_id_for(tier, interval)
            .ok_or_else(|| {
                let err = SubscriptionError::MissingPrice(format!("{tier}/{interval}"));
                warn!(
                    %user_id,
                    %tier,
                    %interval,
                    status = err.status_code().as_u16(),
                    "subscriptions: no price configured for tier"
                );
                err
            })?
            .to_string();

        // A still-running subscription is scheduled to lapse at the provider
        // before the replacement checkout starts.
        let current = self
            .subscription_repo
            .find_current_active_subscription(user_id)
            .await
            .map_err(SubscriptionError::Internal)?;
        if let Some(current) = current {
            if let Some(provider_subscription_id) = current.provider_subscription_id.as_deref() {
                info!(
                    %user_id,
                    provider_subscription_id,
                    "subscriptions: scheduling cancel_at_period_end before new checkout"
                );
                self.stripe_client
                    .cancel_subscription(provider_subscription_id)
                    .await
                    .map_err(|err| {
                        error!(
                            %user_id,
                            provider_subscription_id,
                            error = ?err,
                            "subscriptions: failed to cancel provider subscription before checkout"
                        );
                        SubscriptionError::Internal(err)
                    })?;
                self.subscription_repo
                    .mark_cancel_at_period_end(user_id)
                    .await
                    .map_err(SubscriptionError::Internal)?;
            }
        }

        let customer_id = match self
            .customer_repo
            .find_customer_ref(user_id, PAYMENT_PROVIDER)
            .await
            .map_err(SubscriptionError::Internal)?
        {
            Some(customer_id) => customer_id,
            None => {
                let customer_id = self
                    .stripe_client
                    .create_customer(&email, user_id)
                    .await
                    .map_err(|err| {
                        error!(%user_id, error = ?err, "subscriptions: stripe customer creation failed");
                        SubscriptionError::Internal(err)
                    })?;
                self.customer_repo
                    .upsert_customer_ref(user_id, PAYMENT_PROVIDER, &customer_id)
                    .await
                    .map_err(SubscriptionError::Internal)?;
                customer_id
            }
        };

        let metadata = HashMap::from([
            ("user_id".to_string(), user_id.to_string()),
            ("tier".to_string(), tier.to_string()),
            ("billing_interval".to_string(), interval.to_string()),
        ]);

        let checkout_url = self
            .stripe_client
            .create_checkout_session(&price_id, Some(customer_id), metadata)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %tier,
                    price_id = %price_id,
                    error = ?err,
                    "subscriptions: stripe checkout session creation failed"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, %tier, "subscriptions: checkout session created");
        Ok(checkout_url)
    }

    pub async fn handle_stripe_webhook(&self, payload: &[u8], signature: &str) -> UseCaseResult<()> {
        let event = self
            .stripe_client
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "subscriptions: stripe webhook verification failed");
                SubscriptionError::InvalidWebhook("signature verification failed".into())
            })?;

        info!(event_type = %event.type_, "subscriptions: stripe webhook verified");

        match event.type_.as_str() {
            "checkout.session.completed" => self.handle_checkout_completed(&event).await?,
            "customer.subscription.deleted" => self.handle_subscription_deleted(&event).await?,
            "invoice.payment_failed" => {
                self.handle_invoice_status_change(&event, SubscriptionStatus::PastDue)
                    .await?
            }
            "invoice.payment_succeeded" => {
                self.handle_invoice_status_change(&event, SubscriptionStatus::Active)
                    .await?
            }
            _ => {
                debug!(event_type = %event.type_, "subscriptions: unhandled stripe event type");
            }
        }

        Ok(())
    }

    pub async fn cancel_subscription(&self, user_id: Uuid) -> UseCaseResult<()> {
        let subscription = self
            .subscription_repo
            .find_current_active_subscription(user_id)
            .await
            .map_err(SubscriptionError::Internal)?
            .ok_or_else(|| {
                let err = SubscriptionError::SubscriptionNotFound;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: no active subscription to cancel"
                );
                err
            })?;

        let provider_subscription_id =
            subscription.provider_subscription_id.ok_or_else(|| {
                let err = SubscriptionError::SubscriptionNotFound;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: active subscription missing provider id"
                );
                err
            })?;

        // Billing first; the local flag follows the provider's acknowledgment.
        self.stripe_client
            .cancel_subscription(&provider_subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %provider_subscription_id,
                    error = ?err,
                    "subscriptions: stripe cancel subscription failed"
                );
                SubscriptionError::Internal(err)
            })?;

        self.subscription_repo
            .mark_cancel_at_period_end(user_id)
            .await
            .map_err(SubscriptionError::Internal)?;

        info!(%user_id, "subscriptions: cancellation scheduled at period end");
        Ok(())
    }

    pub async fn preview_downgrade(
        &self,
        user_id: Uuid,
        target: Option<PlanTier>,
    ) -> Result<DowngradeImpact, DowngradeError> {
        let usage = self.usage_usecase.get_user_usage(user_id).await?;
        check_downgrade_impact(&usage, target)
    }

    pub async fn request_downgrade(
        &self,
        user_id: Uuid,
        user_email: Option<String>,
        request: DowngradeRequest,
    ) -> Result<DowngradeOutcome, DowngradeError> {
        let impact = self.preview_downgrade(user_id, request.target).await?;

        if impact.has_any_impact && !request.confirmed {
            warn!(
                %user_id,
                target = %impact.target_tier,
                "subscriptions: downgrade needs explicit confirmation"
            );
            return Err(DowngradeError::ConfirmationRequired(impact));
        }

        let target = impact.target_tier;
        info!(%user_id, %target, "subscriptions: downgrade confirmed");

        let subscription = self
            .subscription_repo
            .find_current_active_subscription(user_id)
            .await
            .map_err(|err| DowngradeError::Checkout(SubscriptionError::Internal(err)))?
            .ok_or(DowngradeError::SubscriptionNotFound)?;

        if target == PlanTier::Free {
            let provider_subscription_id = subscription
                .provider_subscription_id
                .ok_or(DowngradeError::SubscriptionNotFound)?;

            // The tier itself only drops when the deletion webhook settles.
            self.stripe_client
                .cancel_subscription(&provider_subscription_id)
                .await
                .map_err(|err| {
                    error!(
                        %user_id,
                        %provider_subscription_id,
                        error = ?err,
                        "subscriptions: stripe cancel failed during downgrade"
                    );
                    DowngradeError::Checkout(SubscriptionError::Internal(err))
                })?;
            self.subscription_repo
                .mark_cancel_at_period_end(user_id)
                .await
                .map_err(|err| DowngradeError::Checkout(SubscriptionError::Internal(err)))?;

            return Ok(DowngradeOutcome::CanceledAtPeriodEnd {
                ends_at: subscription.ends_at,
            });
        }

        // Moving to a lower paid tier settles through checkout like any
        // other tier change.
        let interval =
            BillingInterval::from_str(&subscription.billing_interval).unwrap_or_default();
        let checkout_url = self
            .create_checkout_session(user_id, user_email, target, interval)
            .await?;

        Ok(DowngradeOutcome::CheckoutRequired { checkout_url })
    }

    async fn handle_checkout_completed(&self, event: &StripeEvent) -> UseCaseResult<()> {
        let session = StripeClient::extract_checkout_session(event).ok_or_else(|| {
            SubscriptionError::InvalidWebhook("missing checkout session".to_string())
        })?;

        let metadata = session
            .metadata
            .ok_or_else(|| SubscriptionError::InvalidWebhook("missing metadata".to_string()))?;

        let user_id = metadata
            .get("user_id")
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| SubscriptionError::InvalidWebhook("missing user_id".to_string()))?;
        let tier = metadata
            .get("tier")
            .and_then(|value| PlanTier::from_str(value))
            .ok_or_else(|| SubscriptionError::InvalidWebhook("missing tier".to_string()))?;
        let interval = metadata
            .get("billing_interval")
            .and_then(|value| BillingInterval::from_str(value))
            .unwrap_or_default();

        if tier == PlanTier::Free {
            return Err(SubscriptionError::InvalidWebhook(
                "free plan cannot be purchased".to_string(),
            ));
        }

        if let Some(customer) = session.customer.as_deref() {
            self.customer_repo
                .upsert_customer_ref(user_id, PAYMENT_PROVIDER, customer)
                .await
                .map_err(SubscriptionError::Internal)?;
        }

        let subscription_id = session.subscription.ok_or_else(|| {
            SubscriptionError::InvalidWebhook("subscription id missing on session".to_string())
        })?;

        let subscription = self
            .stripe_client
            .retrieve_subscription(&subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %subscription_id,
                    error = ?err,
                    "subscriptions: failed to retrieve subscription from stripe"
                );
                SubscriptionError::Internal(err)
            })?;

        let starts_at = subscription.period_start().and_then(ts_to_datetime).ok_or_else(|| {
            SubscriptionError::InvalidWebhook("period start missing on subscription".to_string())
        })?;
        let ends_at = subscription.period_end().and_then(ts_to_datetime).ok_or_else(|| {
            SubscriptionError::InvalidWebhook("period end missing on subscription".to_string())
        })?;

        self.subscription_repo
            .replace_active_subscription(InsertSubscriptionEntity {
                user_id,
                tier: tier.to_string(),
                billing_interval: interval.to_string(),
                starts_at,
                ends_at,
                cancel_at_period_end: false,
                canceled_at: None,
                provider_subscription_id: Some(subscription_id.clone()),
                status: SubscriptionStatus::Active.to_string(),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %tier,
                    db_error = ?err,
                    "subscriptions: failed to apply settled tier change"
                );
                SubscriptionError::Internal(err)
            })?;

        // Tier changed: stale ceilings must not survive in the usage cache.
        self.usage_usecase.invalidate(user_id).await;

        info!(
            %user_id,
            %tier,
            %subscription_id,
            "subscriptions: settled checkout applied"
        );
        Ok(())
    }

    async fn handle_subscription_deleted(&self, event: &StripeEvent) -> UseCaseResult<()> {
        #[derive(Deserialize)]
        struct SubscriptionObject {
            id: Option<String>,
        }

        let subscription: SubscriptionObject = serde_json::from_value(event.data.object.clone())
            .map_err(|_| {
                SubscriptionError::InvalidWebhook("invalid subscription payload".to_string())
            })?;
        let subscription_id = subscription.id.ok_or_else(|| {
            SubscriptionError::InvalidWebhook("missing subscription id".to_string())
        })?;

        let local = self
            .subscription_repo
            .find_by_provider_subscription_id(&subscription_id)
            .await
            .map_err(SubscriptionError::Internal)?;

        self.subscription_repo
            .update_status_by_provider_subscription_id(&subscription_id, SubscriptionStatus::Expired)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to expire subscription from webhook"
                );
                SubscriptionError::Internal(err)
            })?;

        if let Some(local) = local {
            // The user just lost the paid tier; drop their cached ceilings.
            self.usage_usecase.invalidate(local.user_id).await;
        }

        info!(subscription_id = %subscription_id, "subscriptions: subscription expired from webhook");
        Ok(())
    }

    async fn handle_invoice_status_change(
        &self,
        event: &StripeEvent,
        status: SubscriptionStatus,
    ) -> UseCaseResult<()> {
        #[derive(Deserialize)]
        struct InvoiceObject {
            subscription: Option<String>,
        }

        let invoice: InvoiceObject = serde_json::from_value(event.data.object.clone())
            .map_err(|_| SubscriptionError::InvalidWebhook("invalid invoice payload".to_string()))?;
        let subscription_id = invoice.subscription.ok_or_else(|| {
            SubscriptionError::InvalidWebhook("invoice missing subscription id".to_string())
        })?;

        let local = self
            .subscription_repo
            .find_by_provider_subscription_id(&subscription_id)
            .await
            .map_err(SubscriptionError::Internal)?;

        self.subscription_repo
            .update_status_by_provider_subscription_id(&subscription_id, status)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to update status from invoice webhook"
                );
                SubscriptionError::Internal(err)
            })?;

        if let Some(local) = local {
            // Past-due rows stop counting as active, which changes the
            // effective tier.
            self.usage_usecase.invalidate(local.user_id).await;
        }

        info!(
            subscription_id = %subscription_id,
            status = %status,
            "subscriptions: status updated from invoice webhook"
        );
        Ok(())
    }
}

fn ts_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use domain::{
        entities::{app_users::AppUserEntity, subscriptions::SubscriptionEntity},
        repositories::{
            app_users::MockAppUserRepository,
            payment_provider_customers::MockPaymentProviderCustomerRepository,
            subscriptions::MockSubscriptionRepository, usage_counts::MockUsageCountsRepository,
        },
        value_objects::usage::{ResourceCounts, UsageSummary},
    };
    use infra::payments::stripe_client::StripeEventData;
    use mockall::{Sequence, predicate::eq};

    use crate::usecases::{plan_resolver::PlanResolver, usage_cache::UsageCache};

    const BACKEND_TIMEOUT: Duration = Duration::from_secs(3);
    const CACHE_TTL: Duration = Duration::from_secs(5);

    type TestUseCase = SubscriptionUseCase<
        MockUsageCountsRepository,
        MockAppUserRepository,
        MockSubscriptionRepository,
        MockPaymentProviderCustomerRepository,
        MockStripeGateway,
    >;

    fn stripe_config() -> StripeConfig {
        StripeConfig {
            secret_key: "sk_test_key".to_string(),
            webhook_secret: "whsec_test".to_string(),
            success_url: "https://app.test/billing/success".to_string(),
            cancel_url: "https://app.test/billing/cancel".to_string(),
            price_started_monthly: "price_started_monthly".to_string(),
            price_started_yearly: "price_started_yearly".to_string(),
            price_pro_monthly: "price_pro_monthly".to_string(),
            price_pro_yearly: "price_pro_yearly".to_string(),
        }
    }

    fn harness_with(
        stripe_config: StripeConfig,
        counts_repo: MockUsageCountsRepository,
        app_user_repo: MockAppUserRepository,
        subscription_repo: MockSubscriptionRepository,
        customer_repo: MockPaymentProviderCustomerRepository,
        gateway: MockStripeGateway,
    ) -> (Arc<UsageCache>, TestUseCase) {
        let subscription_repo = Arc::new(subscription_repo);
        let cache = Arc::new(UsageCache::new(CACHE_TTL));

        let plan_resolver = Arc::new(PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::clone(&subscription_repo),
            BACKEND_TIMEOUT,
        ));
        let usage_usecase = Arc::new(UsageUseCase::new(
            Arc::new(counts_repo),
            plan_resolver,
            Arc::clone(&cache),
            BACKEND_TIMEOUT,
        ));

        let usecase = SubscriptionUseCase::new(
            Arc::clone(&subscription_repo),
            Arc::new(customer_repo),
            Arc::new(gateway),
            usage_usecase,
            stripe_config,
        );

        (cache, usecase)
    }

    fn harness(
        counts_repo: MockUsageCountsRepository,
        app_user_repo: MockAppUserRepository,
        subscription_repo: MockSubscriptionRepository,
        customer_repo: MockPaymentProviderCustomerRepository,
        gateway: MockStripeGateway,
    ) -> (Arc<UsageCache>, TestUseCase) {
        harness_with(
            stripe_config(),
            counts_repo,
            app_user_repo,
            subscription_repo,
            customer_repo,
            gateway,
        )
    }

    fn mock_user(app_user_repo: &mut MockAppUserRepository) {
        app_user_repo.expect_find_by_id().returning(|id| {
            let now = Utc::now();
            let user = AppUserEntity {
                id,
                email: Some("user@example.com".to_string()),
                status: "active".to_string(),
                created_at: now,
                updated_at: now,
            };
            Box::pin(async move { Ok(Some(user)) })
        });
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

    fn mock_counts(counts_repo: &mut MockUsageCountsRepository, snippets: i64) {
        counts_repo.expect_fetch_counts().returning(move |_| {
            Box::pin(async move {
                Ok(ResourceCounts {
                    snippets,
                    ..Default::default()
                })
            })
        });
    }

    fn checkout_completed_event(user_id: Uuid, tier: &str) -> StripeEvent {
        StripeEvent {
            id: Some("evt_1".to_string()),
            type_: "checkout.session.completed".to_string(),
            created: None,
            livemode: Some(false),
            data: StripeEventData {
                object: serde_json::json!({
                    "id": "cs_test_1",
                    "mode": "subscription",
                    "subscription": "sub_456",
                    "customer": "cus_1",
                    "metadata": {
                        "user_id": user_id.to_string(),
                        "tier": tier,
                        "billing_interval": "monthly",
                    },
                }),
            },
        }
    }

    #[test]
    fn list_plans_exposes_every_registry_tier() {
        let (_cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            MockSubscriptionRepository::new(),
            MockPaymentProviderCustomerRepository::new(),
            MockStripeGateway::new(),
        );

        let plans = usecase.list_plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].tier, PlanTier::Free);
        assert!(plans[0].pricing.is_none());
        assert!(plans[2].pricing.is_some());
    }

    #[tokio::test]
    async fn checkout_requires_an_email() {
        let (_cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            MockSubscriptionRepository::new(),
            MockPaymentProviderCustomerRepository::new(),
            MockStripeGateway::new(),
        );

        let err = usecase
            .create_checkout_session(Uuid::new_v4(), None, PlanTier::Pro, BillingInterval::Monthly)
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::MissingEmail));
    }

    #[tokio::test]
    async fn free_tier_checkout_is_rejected() {
        let (_cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            MockSubscriptionRepository::new(),
            MockPaymentProviderCustomerRepository::new(),
            MockStripeGateway::new(),
        );

        let err = usecase
            .create_checkout_session(
                Uuid::new_v4(),
                Some("user@example.com".to_string()),
                PlanTier::Free,
                BillingInterval::Monthly,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::FreeTierCheckout));
    }

    #[tokio::test]
    async fn unconfigured_price_is_rejected() {
        let mut config = stripe_config();
        config.price_pro_yearly = String::new();

        let (_cache, usecase) = harness_with(
            config,
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            MockSubscriptionRepository::new(),
            MockPaymentProviderCustomerRepository::new(),
            MockStripeGateway::new(),
        );

        let err = usecase
            .create_checkout_session(
                Uuid::new_v4(),
                Some("user@example.com".to_string()),
                PlanTier::Pro,
                BillingInterval::Yearly,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::MissingPrice(_)));
    }

    #[tokio::test]
    async fn checkout_creates_the_customer_once_and_returns_the_session_url() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_current_active_subscription()
            .returning(|_| Box::pin(async { Ok(None) }));

        let mut customer_repo = MockPaymentProviderCustomerRepository::new();
        customer_repo
            .expect_find_customer_ref()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        customer_repo
            .expect_upsert_customer_ref()
            .with(eq(user_id), eq("stripe"), eq("cus_1"))
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let mut gateway = MockStripeGateway::new();
        gateway
            .expect_create_customer()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok("cus_1".to_string()) }));
        gateway
            .expect_create_checkout_session()
            .withf(|price_id, customer_id, metadata| {
                price_id == "price_pro_monthly"
                    && customer_id.as_deref() == Some("cus_1")
                    && metadata.get("tier").map(String::as_str) == Some("pro")
            })
            .times(1)
            .returning(|_, _, _| {
                Box::pin(async { Ok("https://checkout.stripe.com/c/pay/cs_1".to_string()) })
            });

        let (_cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            subscription_repo,
            customer_repo,
            gateway,
        );

        let url = usecase
            .create_checkout_session(
                user_id,
                Some("user@example.com".to_string()),
                PlanTier::Pro,
                BillingInterval::Monthly,
            )
            .await
            .unwrap();
        assert_eq!(url, "https://checkout.stripe.com/c/pay/cs_1");
    }

    #[tokio::test]
    async fn settled_checkout_applies_the_tier_and_drops_the_cached_summary() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_replace_active_subscription()
            .withf(move |entity| {
                entity.user_id == user_id
                    && entity.tier == "started"
                    && entity.status == "active"
                    && entity.provider_subscription_id.as_deref() == Some("sub_456")
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let mut customer_repo = MockPaymentProviderCustomerRepository::new();
        customer_repo
            .expect_upsert_customer_ref()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let mut gateway = MockStripeGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(checkout_completed_event(user_id, "started")));
        gateway.expect_retrieve_subscription().returning(|_| {
            Box::pin(async {
                Ok(StripeSubscription {
                    current_period_start: Some(1_700_000_000),
                    current_period_end: Some(1_702_592_000),
                    billing_cycle_anchor: None,
                    items: Default::default(),
                })
            })
        });

        let (cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            subscription_repo,
            customer_repo,
            gateway,
        );

        // Stale free-tier summary that must not survive the plan change.
        cache
            .insert(
                user_id,
                UsageSummary::from_counts(PlanTier::Free, ResourceCounts::default()),
            )
            .await;

        usecase
            .handle_stripe_webhook(b"{}", "t=0,v1=sig")
            .await
            .unwrap();

        assert!(cache.get(user_id).await.is_none());
    }

    #[tokio::test]
    async fn tampered_webhook_is_rejected() {
        let mut gateway = MockStripeGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("invalid webhook signature")));

        let (_cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            MockSubscriptionRepository::new(),
            MockPaymentProviderCustomerRepository::new(),
            gateway,
        );

        let err = usecase
            .handle_stripe_webhook(b"{}", "t=0,v1=bad")
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidWebhook(_)));
    }

    #[tokio::test]
    async fn deletion_webhook_expires_the_row_and_invalidates_the_user() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        let local = sample_subscription(user_id, "started");
        subscription_repo
            .expect_find_by_provider_subscription_id()
            .with(eq("sub_123"))
            .returning(move |_| {
                let local = local.clone();
                Box::pin(async move { Ok(Some(local)) })
            });
        subscription_repo
            .expect_update_status_by_provider_subscription_id()
            .with(eq("sub_123"), eq(SubscriptionStatus::Expired))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut gateway = MockStripeGateway::new();
        gateway.expect_verify_webhook_signature().returning(|_, _| {
            Ok(StripeEvent {
                id: Some("evt_2".to_string()),
                type_: "customer.subscription.deleted".to_string(),
                created: None,
                livemode: Some(false),
                data: StripeEventData {
                    object: serde_json::json!({ "id": "sub_123" }),
                },
            })
        });

        let (cache, usecase) = harness(
            MockUsageCountsRepository::new(),
            MockAppUserRepository::new(),
            subscription_repo,
            MockPaymentProviderCustomerRepository::new(),
            gateway,
        );

        cache
            .insert(
                user_id,
                UsageSummary::from_counts(PlanTier::Started, ResourceCounts::default()),
            )
            .await;

        usecase
            .handle_stripe_webhook(b"{}", "t=0,v1=sig")
            .await
            .unwrap();

        assert!(cache.get(user_id).await.is_none());
    }

    #[tokio::test]
    async fn over_limit_downgrade_requires_explicit_confirmation() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        mock_user(&mut app_user_repo);

        let mut subscription_repo = MockSubscriptionRepository::new();
        let subscription = sample_subscription(user_id, "pro");
        subscription_repo
            .expect_find_current_active_subscription()
            .returning(move |_| {
                let subscription = subscription.clone();
                Box::pin(async move { Ok(Some(subscription)) })
            });

        let mut counts_repo = MockUsageCountsRepository::new();
        mock_counts(&mut counts_repo, 60);

        // No gateway expectations: billing must stay untouched.
        let (_cache, usecase) = harness(
            counts_repo,
            app_user_repo,
            subscription_repo,
            MockPaymentProviderCustomerRepository::new(),
            MockStripeGateway::new(),
        );

        let err = usecase
            .request_downgrade(
                user_id,
                None,
                DowngradeRequest {
                    target: Some(PlanTier::Started),
                    confirmed: false,
                },
            )
            .await
            .unwrap_err();

        match err {
            DowngradeError::ConfirmationRequired(impact) => {
                assert_eq!(impact.target_tier, PlanTier::Started);
                assert_eq!(impact.snippets.over_limit, 10);
                assert!(impact.has_any_impact);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn downgrade_to_free_settles_billing_before_local_state() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        mock_user(&mut app_user_repo);

        let mut subscription_repo = MockSubscriptionRepository::new();
        let subscription = sample_subscription(user_id, "started");
        subscription_repo
            .expect_find_current_active_subscription()
            .returning(move |_| {
                let subscription = subscription.clone();
                Box::pin(async move { Ok(Some(subscription)) })
            });

        let mut counts_repo = MockUsageCountsRepository::new();
        mock_counts(&mut counts_repo, 0);

        let mut seq = Sequence::new();
        let mut gateway = MockStripeGateway::new();
        gateway
            .expect_cancel_subscription()
            .with(eq("sub_123"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Box::pin(async { Ok(()) }));
        subscription_repo
            .expect_mark_cancel_at_period_end()
            .with(eq(user_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Box::pin(async { Ok(()) }));

        let (_cache, usecase) = harness(
            counts_repo,
            app_user_repo,
            subscription_repo,
            MockPaymentProviderCustomerRepository::new(),
            gateway,
        );

        let outcome = usecase
            .request_downgrade(
                user_id,
                None,
                DowngradeRequest {
                    target: None,
                    confirmed: false,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, DowngradeOutcome::CanceledAtPeriodEnd { .. }));
    }

    #[tokio::test]
    async fn downgrade_to_a_lower_paid_tier_goes_through_checkout() {
        let user_id = Uuid::new_v4();

        let mut app_user_repo = MockAppUserRepository::new();
        mock_user(&mut app_user_repo);

        let mut subscription_repo = MockSubscriptionRepository::new();
        let subscription = sample_subscription(user_id, "pro");
        subscription_repo
            .expect_find_current_active_subscription()
            .returning(move |_| {
                let subscription = subscription.clone();
                Box::pin(async move { Ok(Some(subscription)) })
            });
        subscription_repo
            .expect_mark_cancel_at_period_end()
            .returning(|_| Box::pin(async { Ok(()) }));

        let mut counts_repo = MockUsageCountsRepository::new();
        mock_counts(&mut counts_repo, 10);

        let mut customer_repo = MockPaymentProviderCustomerRepository::new();
        customer_repo
            .expect_find_customer_ref()
            .returning(|_, _| Box::pin(async { Ok(Some("cus_9".to_string())) }));

        let mut gateway = MockStripeGateway::new();
        gateway
            .expect_cancel_subscription()
            .returning(|_| Box::pin(async { Ok(()) }));
        gateway
            .expect_create_checkout_session()
            .withf(|price_id, _, metadata| {
                price_id == "price_started_monthly"
                    && metadata.get("tier").map(String::as_str) == Some("started")
            })
            .times(1)
            .returning(|_, _, _| {
                Box::pin(async { Ok("https://checkout.stripe.com/c/pay/cs_2".to_string()) })
            });

        let (_cache, usecase) = harness(
            counts_repo,
            app_user_repo,
            subscription_repo,
            customer_repo,
            gateway,
        );

        let outcome = usecase
            .request_downgrade(
                user_id,
                Some("user@example.com".to_string()),
                DowngradeRequest {
                    target: Some(PlanTier::Started),
                    confirmed: false,
                },
            )
            .await
            .unwrap();

        match outcome {
            DowngradeOutcome::CheckoutRequired { checkout_url } => {
                assert_eq!(checkout_url, "https://checkout.stripe.com/c/pay/cs_2");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
