use std::sync::Arc;

use anyhow::Context;

use super::event::{EventKind, WebhookEvent};
use super::fields::PickupMetadata;
use super::idempotency::IdempotencyKey;
use super::verification::{VerificationError, WebhookVerifier};
use crate::billing::{SubscriptionMetadataClient, UpdateMetadataRequest};
use crate::error::{Result, WebhookError};

/// What happened to an acknowledged delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Subscription metadata was updated.
    Processed {
        subscription_id: String,
        idempotency_key: IdempotencyKey,
    },
    /// Event type this service does not act on.
    Ignored { event_type: String },
}

/// Runs one delivery through verification, dispatch and the metadata update.
///
/// # Example
///
/// ```rust,ignore
/// use pickup_webhook::webhooks::{StripeSignatureVerifier, WebhookProcessor};
///
/// let processor = WebhookProcessor::new(
///     Arc::new(StripeSignatureVerifier::new(secret)),
///     Arc::new(stripe_client),
/// );
/// processor.process(&body, signature_header).await?;
/// ```
#[derive(Clone)]
pub struct WebhookProcessor {
    verifier: Arc<dyn WebhookVerifier>,
    client: Arc<dyn SubscriptionMetadataClient>,
}

impl WebhookProcessor {
    pub fn new(
        verifier: Arc<dyn WebhookVerifier>,
        client: Arc<dyn SubscriptionMetadataClient>,
    ) -> Self {
        Self { verifier, client }
    }

    /// Process a raw delivery.
    ///
    /// `signature_header` is `None` when the request carried no
    /// `Stripe-Signature` header.
    pub async fn process(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookOutcome> {
        let signature_header = signature_header.ok_or(VerificationError::MissingHeader)?;

        let event = self.verifier.construct_event(payload, signature_header)?;

        tracing::debug!(
            target: "pickup_webhook::webhook",
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Webhook signature verified"
        );

        match event.kind() {
            EventKind::CheckoutSessionCompleted => self.handle_checkout_completed(&event).await,
            EventKind::Other(event_type) => {
                tracing::info!(
                    target: "pickup_webhook::webhook",
                    event_id = %event.id,
                    event_type = %event_type,
                    "Unhandled event type"
                );
                Ok(WebhookOutcome::Ignored { event_type })
            }
        }
    }

    async fn handle_checkout_completed(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
        let session = event
            .checkout_session()
            .with_context(|| format!("event {} does not carry a checkout session", event.id))?;

        let Some(subscription_id) = session.subscription_id() else {
            tracing::warn!(
                target: "pickup_webhook::webhook",
                event_id = %event.id,
                session_id = %session.id,
                "Checkout session has no subscription"
            );
            return Err(WebhookError::MissingSubscription);
        };

        let metadata = PickupMetadata::from_session(&session);
        let idempotency_key = IdempotencyKey::for_checkout_session(&session.id);

        tracing::info!(
            target: "pickup_webhook::webhook",
            event_id = %event.id,
            session_id = %session.id,
            subscription_id = %subscription_id,
            building_name = %metadata.building_name,
            room_number = %metadata.room_number,
            pickup_time = %metadata.pickup_time,
            "Updating subscription with pickup details"
        );

        let request = UpdateMetadataRequest {
            subscription_id: subscription_id.to_string(),
            metadata,
            idempotency_key: idempotency_key.clone(),
        };

        self.client.update_metadata(request).await?;

        tracing::info!(
            target: "pickup_webhook::webhook",
            event_id = %event.id,
            subscription_id = %subscription_id,
            idempotency_key = %idempotency_key,
            "Subscription metadata updated"
        );

        Ok(WebhookOutcome::Processed {
            subscription_id: subscription_id.to_string(),
            idempotency_key,
        })
    }
}

impl std::fmt::Debug for WebhookProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookProcessor").finish_non_exhaustive()
    }
}
