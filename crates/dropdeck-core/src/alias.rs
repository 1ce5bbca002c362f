//! Alias rules applied to bundles after normalization.
//!
//! A handful of older frontend screens look dropdowns up under a second key.
//! Rather than special-casing those screens inside the adapters, each case is
//! a row in an [`AliasTable`].

use crate::bundle::DropdownBundle;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Expose `{screen}_{source}` also as `{screen}_{alias}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    /// Screen the rule applies to
    pub screen: String,
    /// Field the data is copied from
    pub source: String,
    /// Field the data is copied to
    pub alias: String,
    /// Also copy alias -> source when only the alias exists
    #[serde(default)]
    pub bidirectional: bool,
}

impl AliasRule {
    /// One-way rule
    #[must_use]
    pub fn new(screen: &str, source: &str, alias: &str) -> Self {
        Self {
            screen: screen.to_string(),
            source: source.to_string(),
            alias: alias.to_string(),
            bidirectional: false,
        }
    }

    /// Rule that works in both directions
    #[must_use]
    pub fn bidirectional(screen: &str, source: &str, alias: &str) -> Self {
        Self {
            bidirectional: true,
            ..Self::new(screen, source, alias)
        }
    }

    /// Rules shipped by default
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("mortgage_step2", "citizenship", "citizenship_countries"),
            Self::bidirectional("mortgage_step1", "when", "when_needed"),
            Self::bidirectional("mortgage_step1", "first", "first_home"),
        ]
    }

    fn source_key(&self) -> String {
        format!("{}_{}", self.screen, self.source)
    }

    fn alias_key(&self) -> String {
        format!("{}_{}", self.screen, self.alias)
    }
}

/// Ordered set of alias rules
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    rules: Vec<AliasRule>,
}

impl AliasTable {
    /// Table from rules
    #[must_use]
    pub fn new(rules: Vec<AliasRule>) -> Self {
        Self { rules }
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule for the bundle's screen; returns how many keys were added
    pub fn apply(&self, bundle: &mut DropdownBundle) -> usize {
        let mut added = 0;
        let screen = bundle.screen_location.clone();
        for rule in self.rules.iter().filter(|r| r.screen == screen) {
            let (source_key, alias_key) = (rule.source_key(), rule.alias_key());
            if bundle.duplicate_key(&source_key, &alias_key, &rule.alias) {
                debug!(screen = %rule.screen, from = %source_key, to = %alias_key, "Added alias");
                added += 1;
            } else if rule.bidirectional
                && bundle.duplicate_key(&alias_key, &source_key, &rule.source)
            {
                debug!(screen = %rule.screen, from = %alias_key, to = %source_key, "Added reverse alias");
                added += 1;
            }
        }
        added
    }
}
