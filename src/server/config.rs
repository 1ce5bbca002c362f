//! Server configuration types
//!
//! Deserialized from `config/default.toml` plus overrides; every section has
//! serde defaults so partial files work.

use dropdeck_core::{AliasRule, ResolverConfig, SourceRepresentation};
use dropdeck_store::StoreOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dropdowns: DropdownsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Resolver settings for the given representation
    pub fn resolver_config(&self, representation: SourceRepresentation) -> ResolverConfig {
        ResolverConfig {
            representation,
            default_language: self.dropdowns.default_language.clone(),
            supported_languages: self.dropdowns.supported_languages.clone(),
            query_timeout: Duration::from_millis(self.database.query_timeout_ms),
            cache_ttl: Some(Duration::from_secs(self.cache.ttl_secs)),
            aliases: self.dropdowns.aliases.clone(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Empty disables the check
    #[serde(default)]
    pub admin_token: String,
}

impl ServerConfig {
    /// Admin token, if one is configured
    pub fn admin_token(&self) -> Option<String> {
        let token = self.admin_token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8003
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: String::new(),
        }
    }
}

/// Content database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` or `sqlite://...`
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Upper bound for one dropdown query
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Pool settings for the store
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/dropdeck.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_query_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

/// Dropdown resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownsConfig {
    /// Explicit representation override; `None` follows the environment
    #[serde(default)]
    pub use_jsonb: Option<bool>,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,
    #[serde(default = "AliasRule::defaults")]
    pub aliases: Vec<AliasRule>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_supported_languages() -> Vec<String> {
    vec!["en".to_string(), "he".to_string(), "ru".to_string()]
}

impl Default for DropdownsConfig {
    fn default() -> Self {
        Self {
            use_jsonb: None,
            default_language: default_language(),
            supported_languages: default_supported_languages(),
            aliases: AliasRule::defaults(),
        }
    }
}

/// Bundle cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds; 0 disables expiry
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8003);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.dropdowns.default_language, "en");
        assert_eq!(config.dropdowns.aliases.len(), 3);
        assert!(config.server.admin_token().is_none());
    }

    #[test]
    fn test_resolver_config() {
        let mut config = AppConfig::default();
        config.database.query_timeout_ms = 250;
        config.cache.ttl_secs = 0;

        let resolver = config.resolver_config(SourceRepresentation::Jsonb);
        assert_eq!(resolver.representation, SourceRepresentation::Jsonb);
        assert_eq!(resolver.query_timeout, Duration::from_millis(250));
        assert_eq!(resolver.cache_ttl, Some(Duration::ZERO));
    }

    #[test]
    fn test_admin_token_trimmed() {
        let server = ServerConfig {
            admin_token: "  secret ".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(server.admin_token().as_deref(), Some("secret"));
    }
}
