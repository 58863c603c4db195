use domain::value_objects::{enums::billing_intervals::BillingInterval, plans::PlanTier};

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub supabase: Supabase,
    pub stripe: Stripe,
    pub usage_engine: UsageEngine,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

/// Stripe credentials plus the environment-specific price ids, keyed by
/// (tier, interval). Amounts shown to users come from the static registry.
#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub price_started_monthly: String,
    pub price_started_yearly: String,
    pub price_pro_monthly: String,
    pub price_pro_yearly: String,
}

impl Stripe {
    pub fn price_id_for(&self, tier: PlanTier, interval: BillingInterval) -> Option<&str> {
        let price_id = match (tier, interval) {
            (PlanTier::Started, BillingInterval::Monthly) => &self.price_started_monthly,
            (PlanTier::Started, BillingInterval::Yearly) => &self.price_started_yearly,
            (PlanTier::Pro, BillingInterval::Monthly) => &self.price_pro_monthly,
            (PlanTier::Pro, BillingInterval::Yearly) => &self.price_pro_yearly,
            (PlanTier::Free, _) => return None,
        };

        if price_id.is_empty() {
            None
        } else {
            Some(price_id)
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsageEngine {
    /// Seconds a cached usage summary stays valid.
    pub cache_ttl_seconds: u64,
    /// Bound on any single backing-store call before it reads as unavailable.
    pub backend_timeout_seconds: u64,
}
