//! Health check endpoints.
//!
//! Provides:
//! - `/api/health` — service status, version and environment (for load balancers)
//! - `/api/content-db/health` — content database round trip with latency

use super::AppState;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use tracing::error;
use utoipa::ToSchema;

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub dropdown_source: String,
    pub timestamp: String,
}

/// Individual component health status
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: &'static str,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn healthy(backend: &'static str, latency_ms: u64) -> Self {
        Self {
            status: "healthy",
            backend,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    fn unhealthy(backend: &'static str, error: String) -> Self {
        Self {
            status: "unhealthy",
            backend,
            latency_ms: None,
            error: Some(error),
        }
    }
}

/// Service health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "dropdeck",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.selection.environment.name().to_string(),
        dropdown_source: state.selection.representation.as_str().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Content database health
#[utoipa::path(
    get,
    path = "/api/content-db/health",
    tag = "health",
    responses(
        (status = 200, description = "Content database reachable", body = ComponentHealth),
        (status = 500, description = "Content database unreachable", body = ComponentHealth)
    )
)]
pub async fn content_db_health(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<ComponentHealth>) {
    let backend = state.source.name();
    let started = Instant::now();
    match state.source.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ComponentHealth::healthy(
                backend,
                started.elapsed().as_millis() as u64,
            )),
        ),
        Err(e) => {
            error!(backend, error = %e, "Content database health check failed");
            let detail = if state.expose_errors() {
                e.to_string()
            } else {
                "content database unreachable".to_string()
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ComponentHealth::unhealthy(backend, detail)),
            )
        }
    }
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/content-db/health", get(content_db_health))
}
