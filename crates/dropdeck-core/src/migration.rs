//! Normalized -> JSONB migration
//!
//! Builds one `dropdown_configs` document per dropdown from the approved
//! translations of every language, using the same key heuristics as the
//! normalized adapter, so both representations resolve to the same bundles
//! once a screen is migrated.

use crate::error::Result;
use crate::keys::{compare_option_values, derive_field_key, derive_option_value, field_name_for};
use crate::source::{
    ComponentKind, ContentRow, DropdownConfigRecord, DropdownConfigWriter, DropdownSource,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Value of `metadata.source` in migrated documents
pub const MIGRATION_SOURCE_TAG: &str = "normalized_migration";

#[derive(Default)]
struct DocumentDraft {
    field_name: String,
    label: BTreeMap<String, String>,
    placeholder: BTreeMap<String, String>,
    options: Vec<(String, BTreeMap<String, String>)>,
    original_keys: Vec<String>,
}

impl DocumentDraft {
    fn option_texts(&mut self, value: String) -> &mut BTreeMap<String, String> {
        let index = match self.options.iter().position(|(v, _)| *v == value) {
            Some(index) => index,
            None => {
                self.options.push((value, BTreeMap::new()));
                self.options.len() - 1
            }
        };
        &mut self.options[index].1
    }

    fn into_document(mut self) -> Value {
        self.options
            .sort_by(|a, b| compare_option_values(&a.0, &b.0));
        self.original_keys.sort();
        self.original_keys.dedup();

        let options: Vec<Value> = self
            .options
            .into_iter()
            .map(|(value, text)| json!({ "value": value, "text": text }))
            .collect();

        let mut document = Map::new();
        document.insert("label".into(), json!(self.label));
        document.insert("placeholder".into(), json!(self.placeholder));
        document.insert("options".into(), Value::Array(options));
        document.insert(
            "metadata".into(),
            json!({ "source": MIGRATION_SOURCE_TAG, "original_keys": self.original_keys }),
        );
        Value::Object(document)
    }
}

/// Build JSONB documents for one screen from multi-language content rows.
///
/// Records are ordered by dropdown key.
#[must_use]
pub fn build_dropdown_configs(screen_location: &str, rows: &[ContentRow]) -> Vec<DropdownConfigRecord> {
    let mut drafts: BTreeMap<String, DocumentDraft> = BTreeMap::new();

    for row in rows {
        if row.content_value.is_empty() {
            continue;
        }
        let Some(kind) = ComponentKind::from_tag(&row.component_type) else {
            warn!(
                content_key = %row.content_key,
                component_type = %row.component_type,
                "Unexpected component type, not migrated"
            );
            continue;
        };

        let key = derive_field_key(&row.content_key);
        let draft = drafts.entry(key.clone()).or_insert_with(|| DocumentDraft {
            field_name: field_name_for(screen_location, &key),
            ..DocumentDraft::default()
        });
        draft.original_keys.push(row.content_key.clone());

        let language = row.language_code.clone();
        let text = row.content_value.clone();
        match kind {
            ComponentKind::Label => {
                draft.label.insert(language, text);
            }
            ComponentKind::Placeholder => {
                draft.placeholder.insert(language, text);
            }
            ComponentKind::Option => {
                draft
                    .option_texts(derive_option_value(&row.content_key))
                    .insert(language, text);
            }
        }
    }

    drafts
        .into_iter()
        .map(|(dropdown_key, draft)| DropdownConfigRecord {
            screen_location: screen_location.to_string(),
            field_name: draft.field_name.clone(),
            dropdown_key,
            dropdown_data: draft.into_document(),
        })
        .collect()
}

/// Outcome of a migration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    /// Screens processed
    pub screens: usize,
    /// Documents built
    pub dropdowns: usize,
    /// Documents newly inserted
    pub inserted: usize,
    /// Documents that replaced an existing row
    pub updated: usize,
    /// Whether writes were skipped
    pub dry_run: bool,
}

/// Copies normalized dropdown content into `dropdown_configs`
pub struct DropdownMigrator<S> {
    store: Arc<S>,
    dry_run: bool,
}

impl<S> DropdownMigrator<S>
where
    S: DropdownSource + DropdownConfigWriter,
{
    /// Create a migrator over a store that can read and write
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Build documents without writing them
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Migrate one screen, or every screen with dropdown content
    pub async fn run(&self, only_screen: Option<&str>) -> Result<MigrationReport> {
        let screens = match only_screen {
            Some(screen) => vec![screen.to_string()],
            None => self.store.list_content_screens().await?,
        };

        let mut report = MigrationReport {
            dry_run: self.dry_run,
            ..MigrationReport::default()
        };

        for screen in &screens {
            let rows = self.store.fetch_content_rows(screen, &[]).await?;
            let records = build_dropdown_configs(screen, &rows);
            info!(
                screen = %screen,
                rows = rows.len(),
                dropdowns = records.len(),
                "Built dropdown documents"
            );

            report.screens += 1;
            report.dropdowns += records.len();
            if self.dry_run {
                continue;
            }

            for record in &records {
                if self.store.upsert_dropdown_config(record).await? {
                    report.inserted += 1;
                } else {
                    report.updated += 1;
                }
            }
        }

        info!(
            screens = report.screens,
            dropdowns = report.dropdowns,
            inserted = report.inserted,
            updated = report.updated,
            dry_run = report.dry_run,
            "Dropdown migration finished"
        );
        Ok(report)
    }
}
