//! Feature flag API endpoints
//!
//! GET /api/feature-flags/dropdown-system - Which dropdown source is active

use super::AppState;
use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use dropdeck_core::{FlagOrigin, SourceSelection};
use serde::Serialize;
use utoipa::ToSchema;

/// Active dropdown source and how it was chosen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DropdownSystemFlags {
    /// Whether dropdowns are read from `dropdown_configs`
    pub use_jsonb: bool,
    /// `jsonb` or `normalized`
    pub representation: String,
    /// Table (or join) queried on a cache miss
    pub source_table: String,
    /// `override` when USE_JSONB_DROPDOWNS decided, else `environment_default`
    pub origin: String,
    /// Deployment environment name
    pub environment: String,
    /// Cache entry lifetime in seconds (absent when entries never expire)
    pub cache_ttl_secs: Option<u64>,
}

impl DropdownSystemFlags {
    pub fn from_selection(selection: &SourceSelection, cache_ttl_secs: Option<u64>) -> Self {
        Self {
            use_jsonb: selection.uses_jsonb(),
            representation: selection.representation.as_str().to_string(),
            source_table: selection.representation.source_table().to_string(),
            origin: match selection.origin {
                FlagOrigin::Override => "override",
                FlagOrigin::EnvironmentDefault => "environment_default",
            }
            .to_string(),
            environment: selection.environment.name().to_string(),
            cache_ttl_secs,
        }
    }
}

/// Get the dropdown source switch
#[utoipa::path(
    get,
    path = "/api/feature-flags/dropdown-system",
    tag = "feature-flags",
    responses(
        (status = 200, description = "Active dropdown source", body = DropdownSystemFlags)
    )
)]
pub async fn get_dropdown_system(
    Extension(state): Extension<AppState>,
) -> Json<DropdownSystemFlags> {
    let ttl = state.resolver.cache().ttl().map(|d| d.as_secs());
    Json(DropdownSystemFlags::from_selection(&state.selection, ttl))
}

/// Create feature flag routes
pub fn feature_flags_routes() -> Router {
    Router::new().route(
        "/api/feature-flags/dropdown-system",
        get(get_dropdown_system),
    )
}
