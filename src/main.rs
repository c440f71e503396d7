use pickup_webhook::{App, AppContext, ConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = match ConfigBuilder::new().from_env().build() {
        Ok(config) => config,
        Err(e) => {
            pickup_webhook::init_tracing();
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    pickup_webhook::init_tracing_with_config(&config);
    pickup_webhook::install_panic_hook();

    tracing::info!(
        api_key_set = config.stripe.has_api_key(),
        webhook_secret_set = config.stripe.has_webhook_secret(),
        webhook_tolerance_seconds = config.stripe.webhook_tolerance_seconds,
        "Stripe settings loaded"
    );

    let context = AppContext::from_config(&config).inspect_err(|e| {
        tracing::error!(error = %e, "Failed to initialize Stripe client");
    })?;

    App::new(config, context).serve().await.inspect_err(|e| {
        tracing::error!(error = %e, "Server error");
    })?;

    Ok(())
}
