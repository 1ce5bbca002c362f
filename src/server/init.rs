//! Server initialization and main run loop

use super::config::AppConfig;
use super::loader::source_selection;
use super::shutdown::wait_for_shutdown_signal;
use super::validation::validate_production_config;
use crate::api::AppState;
use anyhow::{Context, Result};
use axum::{routing::get, Extension, Router};
use dropdeck_core::{BundleCache, DropdownResolver, DropdownSource, SourceSelection};
use dropdeck_store::DropdownStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Open the content store named by `database.url`
pub async fn connect_store(config: &AppConfig) -> Result<DropdownStore> {
    let store = DropdownStore::connect(&config.database.url, &config.database.store_options())
        .await
        .with_context(|| format!("Failed to open content database ({})", redacted(&config.database.url)))?;
    info!(backend = store.backend(), "Content store ready");
    Ok(store)
}

/// Build the resolver and shared handler state
pub fn build_state(
    config: &AppConfig,
    selection: SourceSelection,
    source: Arc<dyn DropdownSource>,
) -> AppState {
    let resolver_config = config.resolver_config(selection.representation);
    let cache = Arc::new(BundleCache::new(resolver_config.cache_ttl));
    let resolver = DropdownResolver::with_cache(Arc::clone(&source), resolver_config, cache);

    AppState {
        resolver: Arc::new(resolver),
        source,
        selection,
        admin_token: config.server.admin_token(),
    }
}

/// Build the main router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(crate::api::api_router())
        // API documentation (Swagger UI at /docs)
        .merge(crate::api::docs_routes())
        .route("/", get(|| async { "Dropdeck dropdown service" }))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Periodically drop expired cache entries
fn start_cache_purge_task(cache: Arc<BundleCache>) -> Option<JoinHandle<()>> {
    let period = cache.ttl()?.max(Duration::from_secs(1));
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(purged, "Purged expired dropdown bundles");
            }
        }
    }))
}

/// Hide credentials in a database URL for logs
fn redacted(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    info!("Starting Dropdeck v{}", env!("CARGO_PKG_VERSION"));

    let selection = source_selection(&config);
    validate_production_config(&config, &selection);
    info!(
        representation = %selection.representation,
        origin = ?selection.origin,
        environment = selection.environment.name(),
        "Dropdown source selected"
    );

    let store = connect_store(&config).await?;
    let state = build_state(&config, selection, Arc::new(store));
    let purge_task = start_cache_purge_task(Arc::clone(state.resolver.cache()));

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(task) = purge_task {
        task.abort();
    }

    info!("Dropdeck shutdown complete");
    Ok(())
}
