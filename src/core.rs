use crate::{
    app::AppContext,
    config::Config,
    error::GENERIC_ERROR_BODY,
    health::HealthRoutes,
    http::RouteModule,
    middleware::MakeRequestUuid,
    webhooks::WebhookRoutes,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::time::Duration;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// The webhook HTTP application
pub struct App {
    router: Router<AppContext>,
    config: Config,
    context: AppContext,
}

impl App {
    /// Creates the app with `/webhook` and `/health` registered
    pub fn new(config: Config, context: AppContext) -> Self {
        Self {
            router: Router::new(),
            config,
            context,
        }
        .register_module(WebhookRoutes)
        .register_module(HealthRoutes)
    }

    /// Register a route module with the application
    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    /// Get the fully layered router for testing purposes
    ///
    /// The returned router can be used with `pickup_webhook::testing` helpers.
    pub fn into_test_router(self) -> Router {
        self.into_router()
    }

    /// Apply state and the middleware stack
    fn into_router(self) -> Router {
        let router = self.router.with_state(self.context);

        // Later layers wrap earlier ones; the list reads inner to outer.
        router
            // Oversized bodies are rejected before any verification work
            .layer(DefaultBodyLimit::max(self.config.server.max_body_size))
            // A panicking handler becomes a 500, the process keeps serving
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Start the application server
    ///
    /// Runs until Ctrl+C or SIGTERM, then drains in-flight requests.
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let router = self.into_router();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Stripe webhook endpoint at http://{}/webhook", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Response for a handler that panicked
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(
        target: "pickup_webhook::webhook",
        panic = %detail,
        "Webhook handler panicked"
    );

    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_BODY).into_response()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give connections a grace period to close
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::testing::{self, MockSubscriptionClient};
    use axum::routing::get;
    use std::sync::Arc;

    struct PanicRoutes;

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    impl RouteModule for PanicRoutes {
        fn routes(&self) -> Router<AppContext> {
            Router::new().route("/boom", get(explode))
        }
    }

    fn app() -> App {
        let config = ConfigBuilder::new()
            .with_stripe_api_key("sk_test_12345678901234567890")
            .with_webhook_secret("whsec_test")
            .build()
            .unwrap();
        let context = AppContext::builder()
            .with_webhook_secret("whsec_test", 600)
            .with_subscription_client(Arc::new(MockSubscriptionClient::new()))
            .build()
            .unwrap();
        App::new(config, context)
    }

    #[tokio::test]
    async fn test_panic_becomes_generic_500() {
        let router = app().register_module(PanicRoutes).into_test_router();

        testing::get(router, "/boom")
            .execute()
            .await
            .assert_server_error()
            .assert_has_header("x-request-id")
            .assert_body_eq(GENERIC_ERROR_BODY)
            .await;
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        testing::get(app().into_test_router(), "/health")
            .header("x-request-id", "req-123")
            .execute()
            .await
            .assert_ok()
            .assert_header("x-request-id", "req-123");
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        testing::get(app().into_test_router(), "/health")
            .execute()
            .await
            .assert_ok()
            .assert_has_header("x-request-id");
    }

    #[tokio::test]
    async fn test_webhook_is_post_only() {
        testing::get(app().into_test_router(), "/webhook")
            .execute()
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_handle_panic_payloads() {
        let response = handle_panic(Box::new("static str"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_panic(Box::new(42_u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
