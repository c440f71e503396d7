use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::app::AppContext;
use crate::http::RouteModule;

/// Health check status
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status_code, Json(self)).into_response()
    }
}

/// Liveness probe. The process answering is the whole check.
pub async fn health_handler() -> HealthResponse {
    HealthResponse {
        status: HealthStatus::Healthy,
    }
}

/// Route module for `GET /health`
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthRoutes;

impl RouteModule for HealthRoutes {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route("/health", get(health_handler))
    }
}
