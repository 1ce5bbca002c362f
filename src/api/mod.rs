//! Web API module for Dropdeck
//!
//! Provides REST API endpoints for:
//! - Dropdown bundles per screen and language
//! - Feature switch introspection
//! - Cache statistics and invalidation
//! - Service and content database health

pub mod cache;
pub mod docs;
pub mod dropdowns;
pub mod feature_flags;
pub mod health;

use axum::Router;
use dropdeck_core::{DropdownResolver, DropdownSource, SourceSelection};
use serde::Serialize;
use std::sync::Arc;

pub use cache::cache_routes;
pub use docs::docs_routes;
pub use dropdowns::dropdowns_routes;
pub use feature_flags::feature_flags_routes;
pub use health::health_routes;

/// State shared by every handler (installed as an `Extension`)
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<DropdownResolver>,
    pub source: Arc<dyn DropdownSource>,
    pub selection: SourceSelection,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Error details are only exposed outside production
    pub fn expose_errors(&self) -> bool {
        !self.selection.environment.is_production()
    }
}

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(dropdowns_routes())
        .merge(feature_flags_routes())
        .merge(cache_routes())
        .merge(health_routes())
}
