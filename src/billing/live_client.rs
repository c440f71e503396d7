//! Live Stripe client implementation.
//!
//! Production Stripe client with per-attempt timeouts, retry on transient
//! failures, secure API key handling and error mapping.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use super::error::BillingError;
use super::subscription::{SubscriptionMetadataClient, UpdateMetadataRequest};

/// Operation name used in logs and errors.
const OP_UPDATE_METADATA: &str = "update_subscription_metadata";

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the live Stripe client.
#[derive(Debug, Clone)]
pub struct LiveStripeClientConfig {
    /// Maximum number of retry attempts for transient failures.
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Per-attempt request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LiveStripeClientConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
            timeout_seconds: 20,
        }
    }
}

impl LiveStripeClientConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set base delay for exponential backoff.
    #[must_use]
    pub fn base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Set maximum delay between retries.
    #[must_use]
    pub fn max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Set request timeout.
    #[must_use]
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

// ============================================================================
// API Key Validation
// ============================================================================

/// Error returned when API key validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidApiKeyError {
    /// Description of why the key is invalid.
    pub reason: String,
}

impl std::fmt::Display for InvalidApiKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid Stripe API key: {}", self.reason)
    }
}

impl std::error::Error for InvalidApiKeyError {}

/// Validate a Stripe API key format.
///
/// Valid formats:
/// - `sk_test_*` - Test mode secret key
/// - `sk_live_*` - Live mode secret key
/// - `rk_test_*` - Test mode restricted key
/// - `rk_live_*` - Live mode restricted key
pub fn validate_api_key(key: &str) -> std::result::Result<(), InvalidApiKeyError> {
    const MIN_KEY_LENGTH: usize = 20;

    if key.is_empty() {
        return Err(InvalidApiKeyError {
            reason: "API key cannot be empty".to_string(),
        });
    }

    if key.len() < MIN_KEY_LENGTH {
        return Err(InvalidApiKeyError {
            reason: format!("API key too short (minimum {} characters)", MIN_KEY_LENGTH),
        });
    }

    let valid_prefixes = ["sk_test_", "sk_live_", "rk_test_", "rk_live_"];
    if !valid_prefixes.iter().any(|prefix| key.starts_with(prefix)) {
        return Err(InvalidApiKeyError {
            reason: "API key must start with sk_test_, sk_live_, rk_test_, or rk_live_"
                .to_string(),
        });
    }

    Ok(())
}

// ============================================================================
// Live Stripe Client
// ============================================================================

/// Live Stripe client for production use.
///
/// # Example
///
/// ```rust,ignore
/// use pickup_webhook::billing::{LiveStripeClient, LiveStripeClientConfig};
///
/// let client = LiveStripeClient::new(
///     "sk_live_xxx".to_string(),
///     LiveStripeClientConfig::default(),
/// )?;
/// ```
#[derive(Clone)]
pub struct LiveStripeClient {
    client: stripe::Client,
    config: LiveStripeClientConfig,
    api_key: SecretString,
}

impl LiveStripeClient {
    /// Create a new live Stripe client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key format is invalid.
    pub fn new(
        api_key: impl Into<SecretString>,
        config: LiveStripeClientConfig,
    ) -> std::result::Result<Self, InvalidApiKeyError> {
        let api_key: SecretString = api_key.into();

        validate_api_key(api_key.expose_secret())?;

        let client = stripe::Client::new(api_key.expose_secret()).with_app_info(
            env!("CARGO_PKG_NAME").to_string(),
            Some(env!("CARGO_PKG_VERSION").to_string()),
            None,
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key format is invalid.
    pub fn with_default_config(
        api_key: impl Into<SecretString>,
    ) -> std::result::Result<Self, InvalidApiKeyError> {
        Self::new(api_key, LiveStripeClientConfig::default())
    }

    /// Check if the client is using a test mode API key.
    #[must_use]
    pub fn is_test_mode(&self) -> bool {
        let key = self.api_key.expose_secret();
        key.starts_with("sk_test_") || key.starts_with("rk_test_")
    }

    /// Get the configured per-attempt timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    /// Client that sends the given idempotency key on every attempt.
    #[inline]
    fn idempotent_client(&self, key: &str) -> stripe::Client {
        self.client
            .clone()
            .with_strategy(stripe::RequestStrategy::Idempotent(key.to_string()))
    }
}

// Debug implementation that doesn't expose the API key
impl std::fmt::Debug for LiveStripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveStripeClient")
            .field("config", &self.config)
            .field("is_test_mode", &self.is_test_mode())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SubscriptionMetadataClient for LiveStripeClient {
    async fn update_metadata(&self, request: UpdateMetadataRequest) -> Result<(), BillingError> {
        let sub_id: stripe::SubscriptionId = request.subscription_id.parse().map_err(|_| {
            BillingError::SubscriptionNotFound {
                subscription_id: request.subscription_id.clone(),
            }
        })?;

        let client = self.idempotent_client(request.idempotency_key.as_str());

        let mut params = stripe::UpdateSubscription::new();
        params.metadata = Some(request.metadata_map());

        with_retry(&self.config, OP_UPDATE_METADATA, &request.subscription_id, || {
            let client = client.clone();
            let sub_id = sub_id.clone();
            let params = params.clone();
            async move { stripe::Subscription::update(&client, &sub_id, params).await }
        })
        .await?;

        Ok(())
    }
}

// ============================================================================
// Retry Logic
// ============================================================================

/// Execute an async operation with retry logic and timeout.
///
/// Retries on:
/// - HTTP 429 (Rate Limited)
/// - HTTP 5xx (Server Errors)
/// - Timeouts
async fn with_retry<T, F, Fut>(
    config: &LiveStripeClientConfig,
    operation: &str,
    subscription_id: &str,
    operation_fn: F,
) -> Result<T, BillingError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = std::result::Result<T, stripe::StripeError>>,
{
    let timeout_duration = Duration::from_secs(config.timeout_seconds);
    let mut attempts = 0;

    loop {
        let result = tokio::time::timeout(timeout_duration, operation_fn()).await;

        match result {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                if !is_retryable_error(&e) || attempts >= config.max_retries {
                    return Err(map_stripe_error(e, operation, subscription_id));
                }

                log_retry(operation, attempts, &e, config);
                sleep_with_backoff(attempts, config).await;
                attempts += 1;
            }
            Err(_timeout) => {
                if attempts >= config.max_retries {
                    return Err(BillingError::Transient {
                        operation: operation.to_string(),
                        message: format!(
                            "Request timed out after {} seconds",
                            config.timeout_seconds
                        ),
                    });
                }

                tracing::warn!(
                    target: "pickup_webhook::stripe",
                    operation = operation,
                    attempt = attempts + 1,
                    timeout_seconds = config.timeout_seconds,
                    "Stripe API request timed out, retrying"
                );

                sleep_with_backoff(attempts, config).await;
                attempts += 1;
            }
        }
    }
}

#[inline]
fn log_retry(operation: &str, attempts: u32, error: &stripe::StripeError, config: &LiveStripeClientConfig) {
    let delay = calculate_backoff_delay(attempts, config.base_delay_ms, config.max_delay_ms);
    tracing::warn!(
        target: "pickup_webhook::stripe",
        operation = operation,
        attempt = attempts + 1,
        delay_ms = delay.as_millis() as u64,
        error = %error,
        "Retrying Stripe API call after transient error"
    );
}

#[inline]
async fn sleep_with_backoff(attempts: u32, config: &LiveStripeClientConfig) {
    let delay = calculate_backoff_delay(attempts, config.base_delay_ms, config.max_delay_ms);
    tokio::time::sleep(delay).await;
}

#[inline]
fn is_retryable_error(error: &stripe::StripeError) -> bool {
    match error {
        stripe::StripeError::Stripe(request_error) => is_retryable_status(request_error.http_status),
        stripe::StripeError::Timeout => true,
        _ => false,
    }
}

/// Rate limited (429) or server errors (5xx)
#[inline]
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Calculate backoff delay with exponential backoff and jitter.
#[inline]
fn calculate_backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2_u64.saturating_pow(attempt));
    let delay_ms = delay_ms.min(max_ms);

    // Jitter of 0-25%
    let jitter = if delay_ms > 0 {
        fastrand::u64(0..=delay_ms / 4)
    } else {
        0
    };
    Duration::from_millis(delay_ms.saturating_add(jitter))
}

// ============================================================================
// Error Mapping
// ============================================================================

fn map_stripe_error(error: stripe::StripeError, operation: &str, subscription_id: &str) -> BillingError {
    match error {
        stripe::StripeError::Stripe(request_error) => {
            let message = request_error
                .message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            let code = request_error.code.as_ref().map(|c| format!("{c:?}"));
            map_request_failure(operation, subscription_id, request_error.http_status, message, code)
        }
        stripe::StripeError::Timeout => BillingError::Transient {
            operation: operation.to_string(),
            message: "Request timed out".to_string(),
        },
        stripe::StripeError::ClientError(msg) => BillingError::Transient {
            operation: operation.to_string(),
            message: format!("HTTP client error: {msg}"),
        },
        other => BillingError::Internal {
            message: format!("{operation}: {other}"),
        },
    }
}

/// Classify a Stripe API error response by HTTP status.
fn map_request_failure(
    operation: &str,
    subscription_id: &str,
    http_status: u16,
    message: String,
    code: Option<String>,
) -> BillingError {
    match http_status {
        404 => BillingError::SubscriptionNotFound {
            subscription_id: subscription_id.to_string(),
        },
        400 | 402 | 409 => BillingError::InvalidSubscriptionState {
            subscription_id: subscription_id.to_string(),
            message,
            code,
        },
        status if is_retryable_status(status) => BillingError::Transient {
            operation: operation.to_string(),
            message,
        },
        status => BillingError::StripeApiError {
            operation: operation.to_string(),
            message,
            code,
            http_status: Some(status),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
