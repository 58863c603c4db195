use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const TEST_SECRET: &str = "supersecretjwtsecretforunittesting123";

fn set_env_vars() {
    unsafe {
        env::set_var("SERVER_PORT", "8080");
        env::set_var("SERVER_BODY_LIMIT", "10");
        env::set_var("SERVER_TIMEOUT", "30");
        env::set_var("DATABASE_URL", "postgres://localhost:5432/db");
        env::set_var("SUPABASE_JWT_SECRET", TEST_SECRET);
        env::set_var("STRIPE_SECRET_KEY", "sk_test_key");
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_test");
        env::set_var("STRIPE_SUCCESS_URL", "https://app.test/billing/success");
        env::set_var("STRIPE_CANCEL_URL", "https://app.test/billing/cancel");
    }
}

fn issue_token(secret: &str, exp: usize) -> String {
    let claims = SupabaseClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        aud: "authenticated".to_string(),
        role: "authenticated".to_string(),
        email: Some("test@example.com".to_string()),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_validate_supabase_jwt_success() {
    set_env_vars();
    let token = issue_token(TEST_SECRET, 9999999999);

    let claims = validate_supabase_jwt(&token).expect("Valid token should pass");
    assert_eq!(claims.sub, "123e4567-e89b-12d3-a456-426614174000");
    assert_eq!(claims.email.as_deref(), Some("test@example.com"));
}

#[test]
fn test_validate_supabase_jwt_expired() {
    set_env_vars();
    let token = issue_token(TEST_SECRET, 1);

    assert!(validate_supabase_jwt(&token).is_err());
}

#[test]
fn test_validate_supabase_jwt_invalid_signature() {
    set_env_vars();
    let token = issue_token("wrongsecret", 9999999999);

    assert!(validate_supabase_jwt(&token).is_err());
}
