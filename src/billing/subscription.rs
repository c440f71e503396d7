//! Subscription metadata updates.
//!
//! The one write this service performs against Stripe.

use async_trait::async_trait;

use super::error::BillingError;
use crate::webhooks::PickupMetadata;
use crate::webhooks::idempotency::IdempotencyKey;

/// Request to replace a subscription's pickup metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMetadataRequest {
    /// Stripe subscription ID (`sub_...`).
    pub subscription_id: String,
    pub metadata: PickupMetadata,
    /// Sent as the `Idempotency-Key` header so redelivered events collapse.
    pub idempotency_key: IdempotencyKey,
}

impl UpdateMetadataRequest {
    /// Metadata as the string map Stripe stores.
    #[must_use]
    pub fn metadata_map(&self) -> std::collections::HashMap<String, String> {
        self.metadata
            .entries()
            .into_iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect()
    }
}

/// Trait for the Stripe subscription operations used by the webhook.
///
/// Implemented by [`LiveStripeClient`](super::LiveStripeClient) in production
/// and by [`MockSubscriptionClient`](crate::testing::MockSubscriptionClient)
/// in tests.
#[async_trait]
pub trait SubscriptionMetadataClient: Send + Sync {
    /// Set the subscription's metadata, tagged with the request's idempotency key.
    async fn update_metadata(&self, request: UpdateMetadataRequest) -> Result<(), BillingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_map_uses_labels() {
        let request = UpdateMetadataRequest {
            subscription_id: "sub_123".to_string(),
            metadata: PickupMetadata {
                building_name: "West Hall".to_string(),
                room_number: "204".to_string(),
                pickup_time: "N/A".to_string(),
            },
            idempotency_key: IdempotencyKey::for_checkout_session("cs_1"),
        };

        let map = request.metadata_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["Building Name"], "West Hall");
        assert_eq!(map["Room Number"], "204");
        assert_eq!(map["Pickup Time"], "N/A");
    }
}
