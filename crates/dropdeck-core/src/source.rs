//! Storage traits and raw row types
//!
//! Backends (PostgreSQL, SQLite, test doubles) implement these traits; the
//! adapters only ever see the rows.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One row of `dropdown_configs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonbRow {
    /// Dropdown key (unique)
    pub dropdown_key: String,
    /// Field name, if the row carries one
    pub field_name: Option<String>,
    /// Per-language label, placeholder and options
    pub dropdown_data: serde_json::Value,
}

/// One approved translation of one content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRow {
    /// Content key of the item
    pub content_key: String,
    /// Component type tag of the item
    pub component_type: String,
    /// Language of the translation
    pub language_code: String,
    /// Translated text
    pub content_value: String,
}

/// Recognized component type tags of content items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// `dropdown_container` or `label`
    Label,
    /// `placeholder`
    Placeholder,
    /// `dropdown_option` or `option`
    Option,
}

impl ComponentKind {
    /// Every tag the normalized query filters on
    pub const TAGS: &'static [&'static str] = &[
        "dropdown_container",
        "dropdown_option",
        "option",
        "placeholder",
        "label",
    ];

    /// Classify a component type tag
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dropdown_container" | "label" => Some(Self::Label),
            "placeholder" => Some(Self::Placeholder),
            "dropdown_option" | "option" => Some(Self::Option),
            _ => None,
        }
    }
}

/// A JSONB document ready to be written to `dropdown_configs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownConfigRecord {
    /// Dropdown key (upsert key)
    pub dropdown_key: String,
    /// Screen the dropdown belongs to
    pub screen_location: String,
    /// Field name
    pub field_name: String,
    /// Document
    pub dropdown_data: serde_json::Value,
}

/// Read access to both representations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DropdownSource: Send + Sync {
    /// Active `dropdown_configs` rows of a screen, ordered by dropdown key
    async fn fetch_dropdown_configs(&self, screen_location: &str) -> Result<Vec<JsonbRow>>;

    /// Approved, active dropdown content rows of a screen.
    ///
    /// Restricted to `languages` unless the slice is empty, in which case
    /// every language is returned. Ordered by content key, then language.
    async fn fetch_content_rows(
        &self,
        screen_location: &str,
        languages: &[String],
    ) -> Result<Vec<ContentRow>>;

    /// Round-trip to the backing store
    async fn ping(&self) -> Result<()>;

    /// Backend name (for logging)
    fn name(&self) -> &'static str;
}

/// Write access used by the normalized-to-JSONB migration
#[async_trait]
pub trait DropdownConfigWriter: Send + Sync {
    /// Screens that have dropdown content in the normalized tables
    async fn list_content_screens(&self) -> Result<Vec<String>>;

    /// Insert or replace one document; `true` when it was newly inserted
    async fn upsert_dropdown_config(&self, record: &DropdownConfigRecord) -> Result<bool>;
}
