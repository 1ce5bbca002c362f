//! Resolver configuration and source selection
//!
//! The active source representation is decided once, at startup, from an
//! explicit override or the deployment environment, and then handed to the
//! resolver as a plain value.

use crate::alias::AliasRule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Backing storage design a bundle was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRepresentation {
    /// One JSON document per dropdown (`dropdown_configs`)
    Jsonb,
    /// Content items joined to content translations
    Normalized,
}

impl SourceRepresentation {
    /// Stable lowercase tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jsonb => "jsonb",
            Self::Normalized => "normalized",
        }
    }

    /// Table (or join) the representation reads from
    #[must_use]
    pub const fn source_table(self) -> &'static str {
        match self {
            Self::Jsonb => "dropdown_configs",
            Self::Normalized => "content_items_translations",
        }
    }
}

impl fmt::Display for SourceRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceRepresentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jsonb" | "json" => Ok(Self::Jsonb),
            "normalized" | "traditional" => Ok(Self::Normalized),
            other => Err(format!("unknown source representation: {other}")),
        }
    }
}

/// Deployment environment the process runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Local development
    Development,
    /// Any non-production, non-development name (staging, test, ...)
    Other(String),
    /// Production deployment
    Production,
}

impl RuntimeEnvironment {
    /// Parse an environment name; empty means development
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Self::Development,
            "prod" | "production" => Self::Production,
            other => Self::Other(other.to_string()),
        }
    }

    /// Read `DROPDECK_ENV`, falling back to `NODE_ENV`
    #[must_use]
    pub fn from_env() -> Self {
        let name = std::env::var("DROPDECK_ENV")
            .or_else(|_| std::env::var("NODE_ENV"))
            .unwrap_or_default();
        Self::from_name(&name)
    }

    /// Environment name as reported in diagnostics
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Other(name) => name,
        }
    }

    /// Whether this is a production deployment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Parse a boolean-ish flag value (`true`/`1`/`yes`/`on` and their negations)
///
/// Returns `None` for blank or unrecognized values.
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where the active representation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagOrigin {
    /// `USE_JSONB_DROPDOWNS` (or `dropdowns.use_jsonb`) was set
    Override,
    /// Derived from the runtime environment
    EnvironmentDefault,
}

/// The startup decision between the two representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    /// Selected representation
    pub representation: SourceRepresentation,
    /// Whether it was explicitly requested
    pub origin: FlagOrigin,
    /// Environment the decision was made in
    pub environment: RuntimeEnvironment,
}

impl SourceSelection {
    /// Decide the representation.
    ///
    /// Production always reads JSONB. Elsewhere the override picks the
    /// representation, and without one the normalized tables are used.
    #[must_use]
    pub fn resolve(use_jsonb: Option<bool>, environment: RuntimeEnvironment) -> Self {
        let (representation, origin) = match use_jsonb {
            Some(true) => (SourceRepresentation::Jsonb, FlagOrigin::Override),
            _ if environment.is_production() => {
                (SourceRepresentation::Jsonb, FlagOrigin::EnvironmentDefault)
            }
            Some(false) => (SourceRepresentation::Normalized, FlagOrigin::Override),
            None => (SourceRepresentation::Normalized, FlagOrigin::EnvironmentDefault),
        };
        Self {
            representation,
            origin,
            environment,
        }
    }

    /// Whether the JSONB path is active
    #[must_use]
    pub fn uses_jsonb(&self) -> bool {
        self.representation == SourceRepresentation::Jsonb
    }
}

/// Resolver tuning knobs
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Representation to read from
    pub representation: SourceRepresentation,
    /// Language used when the requested one has no text
    pub default_language: String,
    /// Languages the data set is expected to carry (others still resolve)
    pub supported_languages: Vec<String>,
    /// Upper bound for one store query
    pub query_timeout: Duration,
    /// Cache entry lifetime (`None` keeps entries until invalidated)
    pub cache_ttl: Option<Duration>,
    /// Alias rules applied after normalization
    pub aliases: Vec<AliasRule>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            representation: SourceRepresentation::Normalized,
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "he".to_string(), "ru".to_string()],
            query_timeout: Duration::from_secs(5),
            cache_ttl: Some(Duration::from_secs(300)),
            aliases: AliasRule::defaults(),
        }
    }
}

impl ResolverConfig {
    /// Same settings, different representation
    #[must_use]
    pub fn with_representation(mut self, representation: SourceRepresentation) -> Self {
        self.representation = representation;
        self
    }

    /// Whether `language` is one of the configured languages
    #[must_use]
    pub fn is_supported(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|l| l == language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_production_defaults_to_jsonb() {
        let selection = SourceSelection::resolve(None, RuntimeEnvironment::Production);
        assert_eq!(selection.representation, SourceRepresentation::Jsonb);
        assert_eq!(selection.origin, FlagOrigin::EnvironmentDefault);
    }

    #[test]
    fn test_development_defaults_to_normalized() {
        let selection = SourceSelection::resolve(None, RuntimeEnvironment::Development);
        assert_eq!(selection.representation, SourceRepresentation::Normalized);

        let staging = SourceSelection::resolve(None, RuntimeEnvironment::from_name("staging"));
        assert_eq!(staging.representation, SourceRepresentation::Normalized);
        assert_eq!(staging.environment.name(), "staging");
    }

    #[test]
    fn test_override_wins() {
        let selection = SourceSelection::resolve(Some(true), RuntimeEnvironment::Development);
        assert!(selection.uses_jsonb());
        assert_eq!(selection.origin, FlagOrigin::Override);

        let selection = SourceSelection::resolve(Some(false), RuntimeEnvironment::Development);
        assert_eq!(selection.representation, SourceRepresentation::Normalized);
        assert_eq!(selection.origin, FlagOrigin::Override);
    }

    #[test]
    fn test_production_ignores_disabling_override() {
        let selection = SourceSelection::resolve(Some(false), RuntimeEnvironment::Production);
        assert!(selection.uses_jsonb());
        assert_eq!(selection.origin, FlagOrigin::EnvironmentDefault);

        let selection = SourceSelection::resolve(Some(true), RuntimeEnvironment::Production);
        assert!(selection.uses_jsonb());
        assert_eq!(selection.origin, FlagOrigin::Override);
    }

    #[test]
    fn test_representation_parsing() {
        assert_eq!(
            "JSONB".parse::<SourceRepresentation>(),
            Ok(SourceRepresentation::Jsonb)
        );
        assert_eq!(
            "traditional".parse::<SourceRepresentation>(),
            Ok(SourceRepresentation::Normalized)
        );
        assert!("xml".parse::<SourceRepresentation>().is_err());
    }

    #[test]
    fn test_environment_names() {
        assert_eq!(RuntimeEnvironment::from_name(""), RuntimeEnvironment::Development);
        assert!(RuntimeEnvironment::from_name("PROD").is_production());
        assert_eq!(RuntimeEnvironment::Production.name(), "production");
    }
}
