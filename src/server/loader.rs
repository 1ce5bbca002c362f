//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use dropdeck_core::{parse_flag, RuntimeEnvironment, SourceSelection};
use tracing::warn;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Variable that forces one representation regardless of environment
pub const USE_JSONB_ENV: &str = "USE_JSONB_DROPDOWNS";

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let environment = RuntimeEnvironment::from_env();

    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", environment.name())).required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority), DROPDECK_DATABASE__URL style
        .add_source(
            Environment::with_prefix("DROPDECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config.dropdowns.use_jsonb =
        jsonb_override(config.dropdowns.use_jsonb, std::env::var(USE_JSONB_ENV).ok());
    Ok(config)
}

/// Combine the configured override with `USE_JSONB_DROPDOWNS`.
///
/// A recognizable environment value wins; anything else keeps the file value.
pub fn jsonb_override(configured: Option<bool>, env_value: Option<String>) -> Option<bool> {
    match env_value {
        Some(raw) if !raw.trim().is_empty() => match parse_flag(&raw) {
            Some(flag) => Some(flag),
            None => {
                warn!(value = %raw, "Ignoring unrecognized {}", USE_JSONB_ENV);
                configured
            }
        },
        _ => configured,
    }
}

/// Decide the active representation for this process
pub fn source_selection(config: &AppConfig) -> SourceSelection {
    SourceSelection::resolve(config.dropdowns.use_jsonb, RuntimeEnvironment::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8003);
        assert_eq!(config.database.query_timeout_ms, 5000);
        assert!(config.dropdowns.use_jsonb.is_none());
        assert_eq!(config.dropdowns.aliases.len(), 3);
        assert!(config.dropdowns.aliases[1].bidirectional);
        assert!(config.server.admin_token().is_none());
    }

    #[test]
    fn test_env_override_wins() {
        assert_eq!(jsonb_override(None, Some("true".into())), Some(true));
        assert_eq!(jsonb_override(Some(true), Some("false".into())), Some(false));
        assert_eq!(jsonb_override(Some(true), None), Some(true));
        assert_eq!(jsonb_override(None, Some("  ".into())), None);
        assert_eq!(jsonb_override(Some(false), Some("maybe".into())), Some(false));
    }
}
