//! API Documentation - Swagger UI
//!
//! Provides OpenAPI documentation at /docs

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{
    cache::{CacheClearResult, CacheStatsView, InvalidateQuery},
    feature_flags::DropdownSystemFlags,
    health::{ComponentHealth, HealthResponse},
};

/// Dropdeck API OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dropdeck API",
        version = "1.0.0",
        description = "Localized dropdown configuration for form screens.

## Overview
- **Dropdowns**: resolved labels, placeholders and options per screen and language
- **Feature flags**: which storage representation serves dropdowns
- **Cache**: statistics and invalidation (admin token when configured)
- **Health**: service and content database checks
",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        crate::api::dropdowns::get_dropdowns,
        crate::api::feature_flags::get_dropdown_system,
        crate::api::cache::cache_stats,
        crate::api::cache::clear_cache,
        crate::api::cache::invalidate_screen,
        crate::api::health::health_check,
        crate::api::health::content_db_health,
    ),
    components(
        schemas(
            DropdownSystemFlags,
            CacheStatsView,
            CacheClearResult,
            InvalidateQuery,
            HealthResponse,
            ComponentHealth,
        )
    ),
    tags(
        (name = "dropdowns", description = "Dropdown resolution"),
        (name = "feature-flags", description = "Dropdown source switch"),
        (name = "cache", description = "Bundle cache management"),
        (name = "health", description = "Health checks"),
    )
)]
pub struct ApiDoc;

/// Create documentation routes
pub fn docs_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/dropdowns/{screen}/{language}",
            "/api/feature-flags/dropdown-system",
            "/api/content/cache/stats",
            "/api/content/cache/clear",
            "/api/dropdowns/{screen}/cache",
            "/api/health",
            "/api/content-db/health",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "{expected}");
        }
    }
}
