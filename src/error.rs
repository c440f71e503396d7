use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::billing::BillingError;
use crate::webhooks::verification::VerificationError;

/// Body returned for any failure whose detail stays in the logs.
pub const GENERIC_ERROR_BODY: &str = "Webhook Handler Error";

/// Everything that can stop a webhook delivery from being acknowledged.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request is not a genuine Stripe delivery.
    #[error("Webhook Error: {0}")]
    Authentication(#[from] VerificationError),

    /// A checkout completed without creating a subscription.
    #[error("No subscription ID")]
    MissingSubscription,

    /// The metadata update was rejected or could not reach Stripe.
    #[error("Update Error: {0}")]
    Downstream(#[from] BillingError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication(_) | Self::MissingSubscription => StatusCode::BAD_REQUEST,
            Self::Downstream(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent back to Stripe.
    ///
    /// Unexpected failures get a fixed body; their detail is only logged.
    pub fn response_body(&self) -> String {
        match self {
            Self::Unexpected(_) => GENERIC_ERROR_BODY.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                target: "pickup_webhook::webhook",
                status = status.as_u16(),
                error = %self,
                "Webhook delivery failed"
            );
        } else {
            tracing::warn!(
                target: "pickup_webhook::webhook",
                status = status.as_u16(),
                error = %self,
                "Webhook delivery rejected"
            );
        }

        (status, self.response_body()).into_response()
    }
}

/// Acknowledgement body returned for every accepted delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Received {
    pub received: bool,
}

impl IntoResponse for Received {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Errors raised while assembling configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Result type alias for webhook handling
pub type Result<T, E = WebhookError> = std::result::Result<T, E>;
