use std::fmt;

/// Prefix shared by every metadata-update idempotency key.
const KEY_PREFIX: &str = "subscription_";

/// Idempotency key sent with the subscription metadata update.
///
/// Derived only from the checkout session id, so a redelivered event yields
/// the same key and Stripe collapses the repeated update into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Build the key for a checkout session.
    #[must_use]
    pub fn for_checkout_session(session_id: &str) -> Self {
        Self(format!("{}{}", KEY_PREFIX, session_id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<IdempotencyKey> for String {
    fn from(key: IdempotencyKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = IdempotencyKey::for_checkout_session("cs_test_a1b2c3");
        assert_eq!(key.as_str(), "subscription_cs_test_a1b2c3");
        assert_eq!(key.to_string(), "subscription_cs_test_a1b2c3");
    }

    #[test]
    fn test_key_is_stable_across_redelivery() {
        let first = IdempotencyKey::for_checkout_session("cs_live_123");
        let redelivered = IdempotencyKey::for_checkout_session("cs_live_123");
        assert_eq!(first, redelivered);
    }

    #[test]
    fn test_distinct_sessions_get_distinct_keys() {
        let a = IdempotencyKey::for_checkout_session("cs_1");
        let b = IdempotencyKey::for_checkout_session("cs_2");
        assert_ne!(a, b);
    }
}
