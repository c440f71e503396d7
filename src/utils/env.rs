/// Get environment variable with PICKUP_ prefix, falling back to unprefixed version
///
/// The unprefixed fallback keeps the conventional names working, so a plain
/// `STRIPE_API_KEY` is picked up when `PICKUP_STRIPE_API_KEY` is not set.
///
/// # Examples
///
/// ```rust,ignore
/// use pickup_webhook::utils::get_env_with_prefix;
///
/// // Checks PICKUP_PORT first, then PORT
/// let port = get_env_with_prefix("PORT");
///
/// // Checks PICKUP_STRIPE_WEBHOOK_SECRET first, then STRIPE_WEBHOOK_SECRET
/// let secret = get_env_with_prefix("STRIPE_WEBHOOK_SECRET");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    let non_empty = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());

    non_empty(&format!("PICKUP_{}", key)).or_else(|| non_empty(key))
}

/// Parse an environment variable, ignoring values that don't parse
pub fn parse_env_with_prefix<T: std::str::FromStr>(key: &str) -> Option<T> {
    get_env_with_prefix(key).and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("PICKUP_ENV_TEST_VAR", "prefixed_value");
            std::env::set_var("ENV_TEST_VAR", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("PICKUP_ENV_TEST_VAR");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ENV_TEST_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_NON_EXISTENT_VAR"), None);
    }

    #[test]
    fn test_empty_value_is_treated_as_unset() {
        unsafe {
            std::env::set_var("ENV_TEST_EMPTY_VAR", "");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_EMPTY_VAR"), None);
        unsafe {
            std::env::remove_var("ENV_TEST_EMPTY_VAR");
        }
    }

    #[test]
    fn test_parse_env_with_prefix() {
        unsafe {
            std::env::set_var("ENV_TEST_NUMBER", "42");
            std::env::set_var("ENV_TEST_GARBAGE", "forty-two");
        }
        assert_eq!(parse_env_with_prefix::<u16>("ENV_TEST_NUMBER"), Some(42));
        assert_eq!(parse_env_with_prefix::<u16>("ENV_TEST_GARBAGE"), None);
        unsafe {
            std::env::remove_var("ENV_TEST_NUMBER");
            std::env::remove_var("ENV_TEST_GARBAGE");
        }
    }
}
