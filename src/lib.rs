//! Pickup webhook - Stripe checkout pickup details service
//!
//! Receives Stripe webhook deliveries, verifies their signatures and, for
//! `checkout.session.completed`, copies the customer's pickup details
//! (building, room, pickup time) from the checkout's custom fields onto the
//! subscription's metadata.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pickup_webhook::{App, AppContext, ConfigBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     pickup_webhook::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     let context = AppContext::from_config(&config)?;
//!
//!     App::new(config, context).serve().await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod billing;
mod config;
mod core;
mod error;
pub mod health;
mod http;
mod middleware;
pub mod testing;
mod utils;
pub mod webhooks;

// Re-exports for public API
pub use app::{AppContext, AppContextBuilder};
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig, StripeConfig};
pub use crate::core::App;
pub use error::{ConfigError, GENERIC_ERROR_BODY, Received, Result, WebhookError};
pub use health::{HealthResponse, HealthStatus};
pub use http::RouteModule;
pub use middleware::{MakeRequestUuid, REQUEST_ID_HEADER};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "pickup_webhook=debug")
/// - `PICKUP_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing with the configured level and format
///
/// `RUST_LOG`, when set, still takes precedence over the configured level.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Route panics through `tracing` so they reach the same log sink as
/// everything else.
///
/// Handler panics are still turned into 500 responses by the router; this
/// only makes sure the panic itself is recorded.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        match info.location() {
            Some(location) => tracing::error!(
                panic = %message,
                file = location.file(),
                line = location.line(),
                "Panic"
            ),
            None => tracing::error!(panic = %message, "Panic"),
        }
    }));
}
