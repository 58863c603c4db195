use anyhow::{Ok, Result};

use super::config_model::{Database, DotEnvyConfig, Server, Stripe, Supabase, UsageEngine};

const DEFAULT_CACHE_TTL_SECONDS: u64 = 5;
const DEFAULT_BACKEND_TIMEOUT_SECONDS: u64 = 3;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let supabase = Supabase {
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
    };

    let stripe = Stripe {
        secret_key: std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY is invalid"),
        webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
            .expect("STRIPE_WEBHOOK_SECRET is invalid"),
        success_url: std::env::var("STRIPE_SUCCESS_URL").expect("STRIPE_SUCCESS_URL is invalid"),
        cancel_url: std::env::var("STRIPE_CANCEL_URL").expect("STRIPE_CANCEL_URL is invalid"),
        price_started_monthly: std::env::var("STRIPE_PRICE_STARTED_MONTHLY").unwrap_or_default(),
        price_started_yearly: std::env::var("STRIPE_PRICE_STARTED_YEARLY").unwrap_or_default(),
        price_pro_monthly: std::env::var("STRIPE_PRICE_PRO_MONTHLY").unwrap_or_default(),
        price_pro_yearly: std::env::var("STRIPE_PRICE_PRO_YEARLY").unwrap_or_default(),
    };

    let usage_engine = UsageEngine {
        cache_ttl_seconds: std::env::var("USAGE_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECONDS),
        backend_timeout_seconds: std::env::var("USAGE_BACKEND_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECONDS),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        supabase,
        stripe,
        usage_engine,
    })
}
