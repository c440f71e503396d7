use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::app::AppContext;
use crate::error::{Received, Result};
use crate::http::RouteModule;

/// Header carrying Stripe's signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Path Stripe delivers events to.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Route module exposing the Stripe webhook endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookRoutes;

impl RouteModule for WebhookRoutes {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route(WEBHOOK_PATH, post(handle_stripe_webhook))
    }
}

/// `POST /webhook`
///
/// The body is taken as raw bytes; it must reach the verifier exactly as
/// Stripe signed it.
pub async fn handle_stripe_webhook(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Received> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    ctx.webhooks().process(&body, signature).await?;

    Ok(Received { received: true })
}
