//! Billing-specific error types.
//!
//! Failures reported by the subscription service. The webhook layer turns
//! every one of these into a 500 so Stripe redelivers the event.

use std::fmt;

/// Errors returned by a [`SubscriptionMetadataClient`](super::SubscriptionMetadataClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// The subscription does not exist (or the id is not a subscription id).
    SubscriptionNotFound { subscription_id: String },
    /// Stripe refused the update for the subscription's current state.
    InvalidSubscriptionState {
        subscription_id: String,
        message: String,
        code: Option<String>,
    },
    /// The call kept failing with retryable errors until the retry budget ran out.
    Transient { operation: String, message: String },
    /// Stripe API returned an error that fits no other bucket.
    StripeApiError {
        operation: String,
        message: String,
        code: Option<String>,
        http_status: Option<u16>,
    },
    /// An unexpected internal error occurred.
    Internal { message: String },
}

impl BillingError {
    /// Whether the failure may go away on redelivery.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl fmt::Display for BillingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriptionNotFound { subscription_id } => {
                write!(f, "No such subscription: '{}'", subscription_id)
            }
            Self::InvalidSubscriptionState { subscription_id, message, code } => {
                write!(f, "Subscription '{}' cannot be updated: {}", subscription_id, message)?;
                if let Some(code) = code {
                    write!(f, " (code: {})", code)?;
                }
                Ok(())
            }
            Self::Transient { operation, message } => {
                write!(f, "Stripe unavailable during '{}': {}", operation, message)
            }
            Self::StripeApiError { operation, message, code, http_status } => {
                write!(f, "Stripe API error during '{}': {}", operation, message)?;
                if let Some(code) = code {
                    write!(f, " (code: {})", code)?;
                }
                if let Some(status) = http_status {
                    write!(f, " [HTTP {}]", status)?;
                }
                Ok(())
            }
            Self::Internal { message } => {
                write!(f, "Internal billing error: {}", message)
            }
        }
    }
}

impl std::error::Error for BillingError {}
