//! Testing utilities for the webhook service
//!
//! - HTTP endpoint testing without running a server
//! - Signed Stripe delivery fixtures
//! - A recording subscription client
//!
//! # Example
//!
//! ```rust,ignore
//! use pickup_webhook::testing::{self, MockSubscriptionClient, checkout_completed_event};
//!
//! #[tokio::test]
//! async fn test_checkout_updates_subscription() {
//!     let client = MockSubscriptionClient::new();
//!     let app = test_app(client.clone());
//!     let event = checkout_completed_event("cs_1", Some("sub_1"), json!([]));
//!
//!     testing::post(app, "/webhook")
//!         .signed_body(SECRET, serde_json::to_vec(&event).unwrap())
//!         .execute()
//!         .await
//!         .assert_ok();
//!
//!     assert_eq!(client.call_count(), 1);
//! }
//! ```

mod fixtures;
mod mock_client;
mod scenario;

pub use fixtures::{checkout_completed_event, event_of_type, fake, field, sign_payload};
pub use mock_client::MockSubscriptionClient;
pub use scenario::{Scenario, ScenarioAssert, get, post};
