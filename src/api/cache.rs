//! Cache management API endpoints
//!
//! GET    /api/content/cache/stats        - Cache counters and keys
//! DELETE /api/content/cache/clear        - Flush every cached bundle
//! POST   /api/cache/clear                - Same, for older clients
//! DELETE /api/dropdowns/:screen/cache    - Invalidate one screen (?language=xx)
//!
//! When an admin token is configured, every endpoint requires it in the
//! `x-dropdeck-admin-token` header.

use super::{ApiResponse, AppState};
use axum::extract::{Extension, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-dropdeck-admin-token";

/// Keys listed in the stats response
const STATS_KEY_SAMPLE: usize = 20;

/// Cache statistics view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStatsView {
    pub keys_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    /// Percentage of lookups served from the cache
    pub hit_rate: f64,
    /// First keys in sorted order
    pub keys: Vec<String>,
    pub ttl_secs: Option<u64>,
}

/// Result of a clear or invalidate call
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheClearResult {
    pub keys_cleared: usize,
    pub message: String,
}

/// Query for targeted invalidation
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct InvalidateQuery {
    /// Only this language (all languages when absent)
    pub language: Option<String>,
}

type Rejection<T> = (StatusCode, Json<ApiResponse<T>>);

/// Check the admin token header when one is configured
fn authorize<T>(state: &AppState, headers: &HeaderMap) -> Result<(), Rejection<T>> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    if provided == Some(expected) {
        Ok(())
    } else {
        warn!("Rejected cache management request without a valid admin token");
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Missing or invalid admin token")),
        ))
    }
}

/// Get cache statistics
#[utoipa::path(
    get,
    path = "/api/content/cache/stats",
    tag = "cache",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStatsView),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn cache_stats(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<CacheStatsView>>, Rejection<CacheStatsView>> {
    authorize(&state, &headers)?;

    let cache = state.resolver.cache();
    let stats = cache.stats();
    let view = CacheStatsView {
        keys_count: stats.keys_count,
        hits: stats.hits,
        misses: stats.misses,
        expired: stats.expired,
        hit_rate: stats.hit_rate(),
        keys: cache.keys().into_iter().take(STATS_KEY_SAMPLE).collect(),
        ttl_secs: stats.ttl_secs,
    };
    Ok(Json(ApiResponse::success(view)))
}

/// Flush the whole cache
#[utoipa::path(
    delete,
    path = "/api/content/cache/clear",
    tag = "cache",
    responses(
        (status = 200, description = "Cache cleared", body = CacheClearResult),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn clear_cache(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<CacheClearResult>>, Rejection<CacheClearResult>> {
    authorize(&state, &headers)?;

    let keys_cleared = state.resolver.cache().clear();
    info!(keys_cleared, "Dropdown cache cleared");
    Ok(Json(ApiResponse::success(CacheClearResult {
        keys_cleared,
        message: format!("Cache cleared successfully. {keys_cleared} keys removed."),
    })))
}

/// Invalidate the cached bundles of one screen
#[utoipa::path(
    delete,
    path = "/api/dropdowns/{screen}/cache",
    tag = "cache",
    params(
        ("screen" = String, Path, description = "Screen location"),
        InvalidateQuery
    ),
    responses(
        (status = 200, description = "Entries invalidated", body = CacheClearResult),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn invalidate_screen(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(screen): Path<String>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<ApiResponse<CacheClearResult>>, Rejection<CacheClearResult>> {
    authorize(&state, &headers)?;

    let keys_cleared = state
        .resolver
        .invalidate(&screen, query.language.as_deref());
    let scope = match query.language.as_deref() {
        Some(language) => format!("{screen} ({language})"),
        None => screen.clone(),
    };
    Ok(Json(ApiResponse::success(CacheClearResult {
        keys_cleared,
        message: format!("Invalidated {keys_cleared} cached bundles for {scope}."),
    })))
}

/// Create cache routes
pub fn cache_routes() -> Router {
    Router::new()
        .route("/api/content/cache/stats", get(cache_stats))
        .route("/api/content/cache/clear", delete(clear_cache))
        .route("/api/cache/clear", post(clear_cache))
        .route("/api/dropdowns/:screen/cache", delete(invalidate_screen))
}
