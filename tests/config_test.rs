//! Tests for loading configuration from the environment
//!
//! Everything touching process env lives in one test so parallel test
//! threads never see each other's variables.

use pickup_webhook::{ConfigBuilder, ConfigError};

const VARS: &[&str] = &[
    "PICKUP_HOST",
    "PICKUP_PORT",
    "PORT",
    "PICKUP_LOG_LEVEL",
    "PICKUP_LOG_JSON",
    "STRIPE_API_KEY",
    "PICKUP_STRIPE_API_KEY",
    "STRIPE_WEBHOOK_SECRET",
    "PICKUP_STRIPE_WEBHOOK_TOLERANCE",
    "PICKUP_STRIPE_TIMEOUT",
    "PICKUP_STRIPE_MAX_RETRIES",
];

fn clear() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

fn set(key: &str, value: &str) {
    unsafe {
        std::env::set_var(key, value);
    }
}

#[test]
fn test_config_from_env() {
    clear();

    // Nothing set: both Stripe secrets are required
    let err = ConfigBuilder::new().from_env().build().unwrap_err();
    assert_eq!(err, ConfigError::Missing("STRIPE_API_KEY"));

    set("STRIPE_API_KEY", "sk_test_unprefixed_1234567890");
    let err = ConfigBuilder::new().from_env().build().unwrap_err();
    assert_eq!(err, ConfigError::Missing("STRIPE_WEBHOOK_SECRET"));

    // Unprefixed names work, defaults fill the rest
    set("STRIPE_WEBHOOK_SECRET", "whsec_from_env");
    set("PORT", "8080");
    let config = ConfigBuilder::new().from_env().build().unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.stripe.webhook_tolerance_seconds, 600);
    assert_eq!(config.stripe.timeout_seconds, 20);
    assert_eq!(config.stripe.max_retries, 2);

    // Prefixed names win over unprefixed ones
    set("PICKUP_PORT", "9090");
    set("PICKUP_HOST", "127.0.0.1");
    set("PICKUP_LOG_LEVEL", "debug");
    set("PICKUP_LOG_JSON", "true");
    set("PICKUP_STRIPE_WEBHOOK_TOLERANCE", "0");
    set("PICKUP_STRIPE_TIMEOUT", "5");
    set("PICKUP_STRIPE_MAX_RETRIES", "4");
    let config = ConfigBuilder::new().from_env().build().unwrap();
    assert_eq!(config.server.addr().unwrap().to_string(), "127.0.0.1:9090");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert_eq!(config.stripe.webhook_tolerance_seconds, 0);
    assert_eq!(config.stripe.timeout_seconds, 5);
    assert_eq!(config.stripe.max_retries, 4);

    // Unparsable numbers fall back to the current value
    set("PICKUP_STRIPE_TIMEOUT", "soon");
    let config = ConfigBuilder::new().from_env().build().unwrap();
    assert_eq!(config.stripe.timeout_seconds, 20);

    // Malformed key is rejected at build time
    set("PICKUP_STRIPE_API_KEY", "pk_live_publishable_123456");
    let err = ConfigBuilder::new().from_env().build().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "STRIPE_API_KEY", .. }));

    // Builder calls after from_env override the environment
    let config = ConfigBuilder::new()
        .from_env()
        .with_stripe_api_key("sk_live_override_1234567890")
        .with_port(3001)
        .build()
        .unwrap();
    assert_eq!(config.server.port, 3001);

    clear();
}
