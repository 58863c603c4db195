use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::enums::{
    billing_intervals::BillingInterval, subscription_statuses::SubscriptionStatus,
};
use crate::value_objects::plans::{Ceiling, PlanConfig, PlanPricing, PlanTier};
use crate::value_objects::usage::DowngradeImpact;

/// Public shape of one registry tier, served by the plans endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDto {
    pub tier: PlanTier,
    pub display_name: &'static str,
    pub description: &'static str,
    pub max_snippets: Ceiling,
    pub max_animations: Ceiling,
    pub max_folders: Ceiling,
    pub max_slides_per_animation: Ceiling,
    pub max_video_exports: Ceiling,
    pub max_public_shares: Ceiling,
    pub remove_watermark: bool,
    pub pricing: Option<PlanPricing>,
}

impl From<&'static PlanConfig> for PlanDto {
    fn from(value: &'static PlanConfig) -> Self {
        Self {
            tier: value.tier,
            display_name: value.display_name,
            description: value.description,
            max_snippets: value.max_snippets,
            max_animations: value.max_animations,
            max_folders: value.max_folders,
            max_slides_per_animation: value.max_slides_per_animation,
            max_video_exports: value.max_video_exports,
            max_public_shares: value.max_public_shares,
            remove_watermark: value.remove_watermark,
            pricing: value.pricing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentSubscriptionDto {
    pub tier: PlanTier,
    pub billing_interval: BillingInterval,
    pub status: SubscriptionStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    pub tier: PlanTier,
    pub billing_interval: BillingInterval,
}

#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    pub checkout_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DowngradeRequest {
    /// Omitted target means "one tier down" from the current tier.
    #[serde(default)]
    pub target: Option<PlanTier>,
    /// The caller has shown the impact to the user and they accepted it.
    #[serde(default)]
    pub confirmed: bool,
}

/// How a confirmed downgrade proceeds. The local tier record only changes
/// once the corresponding billing settlement webhook arrives.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DowngradeOutcome {
    /// Stripe acknowledged cancel-at-period-end; tier drops when the
    /// deletion webhook settles.
    CanceledAtPeriodEnd { ends_at: DateTime<Utc> },
    /// Moving to a lower paid tier requires checking out the new price.
    CheckoutRequired { checkout_url: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DowngradePreviewDto {
    pub impact: DowngradeImpact,
}
