//! JSONB representation: one document per dropdown.

use super::SourceAdapter;
use crate::bundle::{BundleBuilder, DropdownBundle, DropdownOption};
use crate::config::SourceRepresentation;
use crate::error::Result;
use crate::keys::field_name_for;
use crate::source::{DropdownSource, JsonbRow};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads `dropdown_configs` documents
pub struct JsonbAdapter {
    source: Arc<dyn DropdownSource>,
    default_language: String,
}

impl JsonbAdapter {
    /// Create an adapter over `source`
    #[must_use]
    pub fn new(source: Arc<dyn DropdownSource>, default_language: &str) -> Self {
        Self {
            source,
            default_language: default_language.to_string(),
        }
    }

    /// Pick the text for `language` from a localized value.
    ///
    /// Accepts `{lang: text}` maps and plain strings. Empty strings count as
    /// missing, so the default language is used instead.
    fn localized(&self, value: Option<&Value>, language: &str, context: &str) -> String {
        match value {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Object(map)) => {
                let pick = |lang: &str| {
                    map.get(lang)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                if let Some(text) = pick(language) {
                    return text;
                }
                match pick(&self.default_language) {
                    Some(text) => {
                        debug!(
                            context,
                            language,
                            fallback = %self.default_language,
                            "Missing translation, using default language"
                        );
                        text
                    }
                    None => String::new(),
                }
            }
            _ => String::new(),
        }
    }

    fn options(&self, row: &JsonbRow, raw: Option<&Value>, language: &str) -> Vec<DropdownOption> {
        let items = match raw {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                warn!(
                    dropdown_key = %row.dropdown_key,
                    "Dropdown options are not an array, ignoring them"
                );
                return Vec::new();
            }
        };

        items
            .iter()
            .filter_map(|item| {
                let value = match item.get("value") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => {
                        warn!(dropdown_key = %row.dropdown_key, "Skipping option without a value");
                        return None;
                    }
                };
                let context = format!("{}:{}", row.dropdown_key, value);
                let text = self.localized(item.get("text"), language, &context);
                if text.is_empty() {
                    debug!(
                        dropdown_key = %row.dropdown_key,
                        value = %value,
                        language,
                        "Option has no text, skipping it"
                    );
                    return None;
                }
                Some(DropdownOption { value, text })
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for JsonbAdapter {
    type Row = JsonbRow;

    fn representation(&self) -> SourceRepresentation {
        SourceRepresentation::Jsonb
    }

    async fn fetch_raw_rows(
        &self,
        screen_location: &str,
        _language_code: &str,
    ) -> Result<Vec<JsonbRow>> {
        self.source.fetch_dropdown_configs(screen_location).await
    }

    fn normalize(
        &self,
        screen_location: &str,
        language_code: &str,
        rows: Vec<JsonbRow>,
    ) -> DropdownBundle {
        let mut builder = BundleBuilder::new(screen_location, language_code, self.representation());
        builder.set_total_rows(rows.len());

        for row in &rows {
            let Some(document) = row.dropdown_data.as_object() else {
                warn!(
                    dropdown_key = %row.dropdown_key,
                    "Dropdown document is not an object, skipping row"
                );
                continue;
            };

            let field_name = row
                .field_name
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| field_name_for(screen_location, &row.dropdown_key));

            let label = self.localized(document.get("label"), language_code, &row.dropdown_key);
            let placeholder =
                self.localized(document.get("placeholder"), language_code, &row.dropdown_key);
            let options = self.options(row, document.get("options"), language_code);
            if label.is_empty() && placeholder.is_empty() && options.is_empty() {
                debug!(
                    dropdown_key = %row.dropdown_key,
                    language = language_code,
                    "Dropdown has no text in this language, skipping row"
                );
                continue;
            }

            builder.put_field(&field_name, &row.dropdown_key, label, placeholder, options);
        }

        builder.build()
    }
}
