//! Stripe webhook handling.
//!
//! Signature verification, event parsing, pickup field extraction and the
//! processor that turns a `checkout.session.completed` delivery into one
//! idempotent subscription metadata update.

pub mod event;
pub mod fields;
pub mod handler;
pub mod idempotency;
pub mod routes;
pub mod verification;

pub use event::{CheckoutSession, CustomField, EventKind, WebhookEvent};
pub use fields::PickupMetadata;
pub use handler::{WebhookOutcome, WebhookProcessor};
pub use idempotency::IdempotencyKey;
pub use routes::WebhookRoutes;
pub use verification::{StripeSignatureVerifier, VerificationError, WebhookVerifier};
