use std::sync::Arc;

use crate::billing::{LiveStripeClient, LiveStripeClientConfig, SubscriptionMetadataClient};
use crate::config::Config;
use crate::error::ConfigError;
use crate::webhooks::{StripeSignatureVerifier, WebhookProcessor, WebhookVerifier};

/// Application context for dependency injection and shared state
///
/// Holds the webhook processor shared by every request. Cloning is cheap;
/// everything inside is behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppContext {
    webhooks: Arc<WebhookProcessor>,
}

impl AppContext {
    pub fn new(webhooks: WebhookProcessor) -> Self {
        Self {
            webhooks: Arc::new(webhooks),
        }
    }

    /// Builder pattern for constructing AppContext
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// Wire the live Stripe client and signature verifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Stripe API key is rejected by the client.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let stripe = &config.stripe;

        let client = LiveStripeClient::new(
            stripe.api_key.clone(),
            LiveStripeClientConfig::new()
                .timeout_seconds(stripe.timeout_seconds)
                .max_retries(stripe.max_retries),
        )
        .map_err(|e| ConfigError::Invalid {
            name: "STRIPE_API_KEY",
            reason: e.reason,
        })?;

        tracing::info!(
            test_mode = client.is_test_mode(),
            timeout_seconds = stripe.timeout_seconds,
            max_retries = stripe.max_retries,
            "Stripe client configured"
        );

        Self::builder()
            .with_verifier(Arc::new(StripeSignatureVerifier::with_tolerance(
                stripe.webhook_secret.clone(),
                stripe.webhook_tolerance_seconds,
            )))
            .with_subscription_client(Arc::new(client))
            .build()
    }

    /// The processor behind `POST /webhook`.
    pub fn webhooks(&self) -> &WebhookProcessor {
        &self.webhooks
    }
}

/// Builder for AppContext
#[must_use = "builder does nothing until you call build()"]
#[derive(Default)]
pub struct AppContextBuilder {
    verifier: Option<Arc<dyn WebhookVerifier>>,
    client: Option<Arc<dyn SubscriptionMetadataClient>>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn WebhookVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Convenience for the usual Stripe verifier with a given secret and tolerance.
    pub fn with_webhook_secret(self, secret: impl Into<String>, tolerance_seconds: u64) -> Self {
        self.with_verifier(Arc::new(StripeSignatureVerifier::with_tolerance(
            secret.into(),
            tolerance_seconds,
        )))
    }

    pub fn with_subscription_client(mut self, client: Arc<dyn SubscriptionMetadataClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the verifier or the subscription client is missing.
    pub fn build(self) -> Result<AppContext, ConfigError> {
        let verifier = self.verifier.ok_or(ConfigError::Missing("webhook verifier"))?;
        let client = self
            .client
            .ok_or(ConfigError::Missing("subscription client"))?;

        Ok(AppContext::new(WebhookProcessor::new(verifier, client)))
    }
}
