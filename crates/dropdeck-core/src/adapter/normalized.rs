//! Normalized representation: content items joined to their translations.

use super::SourceAdapter;
use crate::bundle::{BundleBuilder, DropdownBundle, DropdownOption};
use crate::config::SourceRepresentation;
use crate::error::Result;
use crate::keys::{compare_option_values, derive_field_key, derive_option_value, field_name_for};
use crate::source::{ComponentKind, ContentRow, DropdownSource};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads `content_items` / `content_translations`
pub struct NormalizedAdapter {
    source: Arc<dyn DropdownSource>,
    default_language: String,
}

impl NormalizedAdapter {
    /// Create an adapter over `source`
    #[must_use]
    pub fn new(source: Arc<dyn DropdownSource>, default_language: &str) -> Self {
        Self {
            source,
            default_language: default_language.to_string(),
        }
    }

    fn languages(&self, language_code: &str) -> Vec<String> {
        let mut languages = vec![language_code.to_string()];
        if language_code != self.default_language {
            languages.push(self.default_language.clone());
        }
        languages
    }

    /// Lower is better; `None` for languages that were not asked for
    fn rank(&self, row: &ContentRow, language_code: &str) -> Option<u8> {
        if row.language_code == language_code {
            Some(0)
        } else if row.language_code == self.default_language {
            Some(1)
        } else {
            None
        }
    }
}

#[async_trait]
impl SourceAdapter for NormalizedAdapter {
    type Row = ContentRow;

    fn representation(&self) -> SourceRepresentation {
        SourceRepresentation::Normalized
    }

    async fn fetch_raw_rows(
        &self,
        screen_location: &str,
        language_code: &str,
    ) -> Result<Vec<ContentRow>> {
        let languages = self.languages(language_code);
        self.source
            .fetch_content_rows(screen_location, &languages)
            .await
    }

    fn normalize(
        &self,
        screen_location: &str,
        language_code: &str,
        rows: Vec<ContentRow>,
    ) -> DropdownBundle {
        let mut builder = BundleBuilder::new(screen_location, language_code, self.representation());
        builder.set_total_rows(rows.len());

        // One translation per (content_key, component_type): requested
        // language first, default language as fallback.
        let mut chosen: BTreeMap<(String, String), (u8, ContentRow)> = BTreeMap::new();
        for row in rows {
            if row.content_value.is_empty() {
                continue;
            }
            let Some(rank) = self.rank(&row, language_code) else {
                continue;
            };
            let slot = (row.content_key.clone(), row.component_type.clone());
            match chosen.get(&slot) {
                Some((existing, _)) if *existing <= rank => {}
                _ => {
                    chosen.insert(slot, (rank, row));
                }
            }
        }

        for ((content_key, component_type), (rank, row)) in chosen {
            let Some(kind) = ComponentKind::from_tag(&component_type) else {
                warn!(
                    content_key = %content_key,
                    component_type = %component_type,
                    "Unexpected component type, skipping row"
                );
                continue;
            };

            if rank > 0 {
                debug!(
                    content_key = %content_key,
                    language = language_code,
                    fallback = %row.language_code,
                    "Missing translation, using default language"
                );
            }

            let key = derive_field_key(&content_key);
            let field_name = field_name_for(screen_location, &key);

            match kind {
                ComponentKind::Label => builder.set_label(&field_name, &key, row.content_value),
                ComponentKind::Placeholder => {
                    builder.set_placeholder(&field_name, &key, row.content_value)
                }
                ComponentKind::Option => builder.push_option(
                    &field_name,
                    &key,
                    DropdownOption {
                        value: derive_option_value(&content_key),
                        text: row.content_value,
                    },
                ),
            }
        }

        builder.sort_options_by(|a, b| compare_option_values(&a.value, &b.value));
        builder.build()
    }
}
