//! Production configuration validation
//!
//! Warnings for risky settings in production deployments.

use super::config::AppConfig;
use dropdeck_core::SourceSelection;
use tracing::warn;

/// Warn about settings that are unsafe or unexpected in production.
///
/// Returns the warnings so callers (and tests) can inspect them.
pub fn validate_production_config(config: &AppConfig, selection: &SourceSelection) -> Vec<String> {
    let mut warnings = Vec::new();
    if !selection.environment.is_production() {
        return warnings;
    }

    if config.server.host == "0.0.0.0" && config.server.admin_token().is_none() {
        warnings.push(
            "Server binds to all interfaces (0.0.0.0) without an admin token; \
             cache management endpoints are open. Set [server] admin_token."
                .to_string(),
        );
    }

    if config.database.url.starts_with("sqlite:") {
        warnings.push(
            "Production is using an SQLite database; point DROPDECK_DATABASE__URL \
             at the content database."
                .to_string(),
        );
    }

    for warning in &warnings {
        warn!("SECURITY WARNING: {}", warning);
    }
    warnings
}
