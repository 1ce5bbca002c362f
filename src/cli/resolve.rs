//! `dropdeck resolve`: print one bundle as JSON

use crate::api::dropdowns::bundle_body;
use crate::server::config::AppConfig;
use crate::server::{build_state, connect_store, source_selection};
use anyhow::{Context, Result};
use dropdeck_core::{FlagOrigin, SourceRepresentation, SourceSelection};
use std::sync::Arc;

/// Representation requested on the command line, if any
pub fn forced_representation(jsonb: bool, normalized: bool) -> Option<SourceRepresentation> {
    match (jsonb, normalized) {
        (true, _) => Some(SourceRepresentation::Jsonb),
        (_, true) => Some(SourceRepresentation::Normalized),
        _ => None,
    }
}

pub async fn run(
    config: &AppConfig,
    screen: &str,
    language: &str,
    force: Option<SourceRepresentation>,
) -> Result<()> {
    let mut selection = source_selection(config);
    if let Some(representation) = force {
        selection = SourceSelection {
            representation,
            origin: FlagOrigin::Override,
            ..selection
        };
    }

    let store = connect_store(config).await?;
    let state = build_state(config, selection, Arc::new(store));
    let resolution = state
        .resolver
        .resolve(screen, language)
        .await
        .with_context(|| format!("Failed to resolve dropdowns for {screen}/{language}"))?;

    let body = bundle_body(&resolution.bundle, resolution.cache_hit, chrono::Utc::now());
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_representation() {
        assert_eq!(forced_representation(false, false), None);
        assert_eq!(
            forced_representation(true, false),
            Some(SourceRepresentation::Jsonb)
        );
        assert_eq!(
            forced_representation(false, true),
            Some(SourceRepresentation::Normalized)
        );
    }
}
