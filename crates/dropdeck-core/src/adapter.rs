//! Source adapters
//!
//! Each representation is one [`SourceAdapter`]: fetch raw rows for a screen,
//! then normalize them into a [`DropdownBundle`]. [`ActiveAdapter`] is the
//! startup-selected variant the resolver dispatches through.

mod jsonb;
mod normalized;

pub use jsonb::JsonbAdapter;
pub use normalized::NormalizedAdapter;

use crate::bundle::DropdownBundle;
use crate::config::SourceRepresentation;
use crate::error::Result;
use crate::source::DropdownSource;
use async_trait::async_trait;
use std::sync::Arc;

/// One backing representation
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Raw row type read from the store
    type Row: Send;

    /// Representation tag stamped on produced bundles
    fn representation(&self) -> SourceRepresentation;

    /// Read every row relevant to `screen_location` in `language_code`
    async fn fetch_raw_rows(
        &self,
        screen_location: &str,
        language_code: &str,
    ) -> Result<Vec<Self::Row>>;

    /// Build a bundle from raw rows. Never fails: bad rows are skipped.
    fn normalize(
        &self,
        screen_location: &str,
        language_code: &str,
        rows: Vec<Self::Row>,
    ) -> DropdownBundle;

    /// Fetch and normalize
    async fn load(&self, screen_location: &str, language_code: &str) -> Result<DropdownBundle> {
        let rows = self.fetch_raw_rows(screen_location, language_code).await?;
        Ok(self.normalize(screen_location, language_code, rows))
    }
}

/// The adapter selected at startup
pub enum ActiveAdapter {
    /// `dropdown_configs` documents
    Jsonb(JsonbAdapter),
    /// `content_items` + `content_translations`
    Normalized(NormalizedAdapter),
}

impl ActiveAdapter {
    /// Build the adapter for `representation` over `source`
    #[must_use]
    pub fn new(
        representation: SourceRepresentation,
        source: Arc<dyn DropdownSource>,
        default_language: &str,
    ) -> Self {
        match representation {
            SourceRepresentation::Jsonb => Self::Jsonb(JsonbAdapter::new(source, default_language)),
            SourceRepresentation::Normalized => {
                Self::Normalized(NormalizedAdapter::new(source, default_language))
            }
        }
    }

    /// Representation of the wrapped adapter
    #[must_use]
    pub fn representation(&self) -> SourceRepresentation {
        match self {
            Self::Jsonb(adapter) => adapter.representation(),
            Self::Normalized(adapter) => adapter.representation(),
        }
    }

    /// Fetch and normalize through the wrapped adapter
    pub async fn load(&self, screen_location: &str, language_code: &str) -> Result<DropdownBundle> {
        match self {
            Self::Jsonb(adapter) => adapter.load(screen_location, language_code).await,
            Self::Normalized(adapter) => adapter.load(screen_location, language_code).await,
        }
    }
}
