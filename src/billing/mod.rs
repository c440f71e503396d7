//! Stripe subscription access.
//!
//! The webhook only ever writes pickup metadata onto an existing
//! subscription. [`SubscriptionMetadataClient`] is the seam; production uses
//! [`LiveStripeClient`], tests use
//! [`MockSubscriptionClient`](crate::testing::MockSubscriptionClient).
//!
//! # Example
//!
//! ```rust,ignore
//! use pickup_webhook::billing::{LiveStripeClient, LiveStripeClientConfig};
//!
//! let client = LiveStripeClient::new(
//!     api_key,
//!     LiveStripeClientConfig::new().timeout_seconds(20).max_retries(2),
//! )?;
//! ```

pub mod error;
pub mod live_client;
pub mod subscription;

pub use error::BillingError;
pub use live_client::{InvalidApiKeyError, LiveStripeClient, LiveStripeClientConfig, validate_api_key};
pub use subscription::{SubscriptionMetadataClient, UpdateMetadataRequest};
