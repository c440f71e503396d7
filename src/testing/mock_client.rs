//! In-memory subscription client for tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::billing::{BillingError, SubscriptionMetadataClient, UpdateMetadataRequest};

/// Records every metadata update instead of calling Stripe.
///
/// Clones share the same call log, so a test can hand one clone to the app
/// and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MockSubscriptionClient {
    calls: Arc<RwLock<Vec<UpdateMetadataRequest>>>,
    failure: Arc<RwLock<Option<BillingError>>>,
}

impl MockSubscriptionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `error` (the call is still recorded).
    pub fn fail_with(&self, error: BillingError) {
        *self.failure.write().unwrap() = Some(error);
    }

    /// Let calls succeed again.
    pub fn succeed(&self) {
        *self.failure.write().unwrap() = None;
    }

    /// All recorded requests, oldest first.
    pub fn calls(&self) -> Vec<UpdateMetadataRequest> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl SubscriptionMetadataClient for MockSubscriptionClient {
    async fn update_metadata(&self, request: UpdateMetadataRequest) -> Result<(), BillingError> {
        self.calls.write().unwrap().push(request);
        match self.failure.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for MockSubscriptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSubscriptionClient")
            .field("call_count", &self.call_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::PickupMetadata;
    use crate::webhooks::idempotency::IdempotencyKey;

    fn request(session: &str) -> UpdateMetadataRequest {
        UpdateMetadataRequest {
            subscription_id: "sub_1".to_string(),
            metadata: PickupMetadata {
                building_name: "N/A".to_string(),
                room_number: "N/A".to_string(),
                pickup_time: "N/A".to_string(),
            },
            idempotency_key: IdempotencyKey::for_checkout_session(session),
        }
    }

    #[tokio::test]
    async fn test_records_calls_across_clones() {
        let client = MockSubscriptionClient::new();
        let shared = client.clone();

        shared.update_metadata(request("cs_1")).await.unwrap();
        shared.update_metadata(request("cs_2")).await.unwrap();

        assert_eq!(client.call_count(), 2);
        assert_eq!(client.calls()[1].idempotency_key.as_str(), "subscription_cs_2");
    }

    #[tokio::test]
    async fn test_fail_with_then_succeed() {
        let client = MockSubscriptionClient::new();
        client.fail_with(BillingError::Internal { message: "down".to_string() });

        assert!(client.update_metadata(request("cs_1")).await.is_err());

        client.succeed();
        assert!(client.update_metadata(request("cs_1")).await.is_ok());
        assert_eq!(client.call_count(), 2);
    }
}
