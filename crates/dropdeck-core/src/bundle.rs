//! Dropdown bundle model and the shared builder both source paths feed.

use crate::config::SourceRepresentation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// One logical dropdown on a screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownEntry {
    /// Dropdown key
    pub key: String,
    /// Display label (falls back to the humanized field name)
    pub label: String,
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    /// Option value submitted by the form
    pub value: String,
    /// Localized option text
    pub text: String,
}

/// Fully resolved, language-specific dropdown definitions for one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownBundle {
    /// Screen the dropdowns belong to
    pub screen_location: String,
    /// Language the texts were resolved for
    pub language_code: String,
    /// Dropdowns ordered by key
    pub dropdowns: Vec<DropdownEntry>,
    /// Options per dropdown key
    pub options_by_key: BTreeMap<String, Vec<DropdownOption>>,
    /// `{key}_option_{value}` to option text
    pub flat_options: BTreeMap<String, String>,
    /// Raw label per dropdown key (may be empty)
    pub labels_by_key: BTreeMap<String, String>,
    /// Placeholder per dropdown key (may be empty)
    pub placeholders_by_key: BTreeMap<String, String>,
    /// Field name to dropdown key
    pub fields: BTreeMap<String, String>,
    /// Representation that produced this bundle (diagnostics only)
    pub source_representation: SourceRepresentation,
    /// Rows read from the store (diagnostics only)
    pub total_rows: usize,
}

impl DropdownBundle {
    /// An empty bundle, the result for screens without configuration
    #[must_use]
    pub fn empty(
        screen_location: impl Into<String>,
        language_code: impl Into<String>,
        source_representation: SourceRepresentation,
    ) -> Self {
        Self {
            screen_location: screen_location.into(),
            language_code: language_code.into(),
            dropdowns: Vec::new(),
            options_by_key: BTreeMap::new(),
            flat_options: BTreeMap::new(),
            labels_by_key: BTreeMap::new(),
            placeholders_by_key: BTreeMap::new(),
            fields: BTreeMap::new(),
            source_representation,
            total_rows: 0,
        }
    }

    /// Whether the screen has no dropdowns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dropdowns.is_empty()
    }

    /// Whether a dropdown with this key exists
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.dropdowns.iter().any(|d| d.key == key)
    }

    /// Options of one dropdown
    #[must_use]
    pub fn options(&self, key: &str) -> Option<&[DropdownOption]> {
        self.options_by_key.get(key).map(Vec::as_slice)
    }

    /// Dropdown entry by key
    #[must_use]
    pub fn dropdown(&self, key: &str) -> Option<&DropdownEntry> {
        self.dropdowns.iter().find(|d| d.key == key)
    }

    /// Copy everything known about `source` under `alias`.
    ///
    /// Returns `false` when `source` is missing or `alias` already exists.
    pub fn duplicate_key(&mut self, source: &str, alias: &str, alias_field: &str) -> bool {
        if !self.contains_key(source) || self.contains_key(alias) {
            return false;
        }

        let options = self.options_by_key.get(source).cloned().unwrap_or_default();
        for option in &options {
            self.flat_options
                .insert(flat_option_key(alias, &option.value), option.text.clone());
        }
        self.options_by_key.insert(alias.to_string(), options);

        let label = self.labels_by_key.get(source).cloned().unwrap_or_default();
        let placeholder = self
            .placeholders_by_key
            .get(source)
            .cloned()
            .unwrap_or_default();
        self.labels_by_key.insert(alias.to_string(), label.clone());
        self.placeholders_by_key
            .insert(alias.to_string(), placeholder);

        self.dropdowns.push(DropdownEntry {
            key: alias.to_string(),
            label: display_label(&label, alias_field),
        });
        true
    }
}

/// Key used in the flat option map
#[must_use]
pub fn flat_option_key(key: &str, value: &str) -> String {
    format!("{key}_option_{value}")
}

fn display_label(label: &str, field_name: &str) -> String {
    if label.is_empty() {
        field_name.replace('_', " ")
    } else {
        label.to_string()
    }
}

#[derive(Debug, Default)]
struct FieldDraft {
    field_name: String,
    label: String,
    placeholder: String,
    options: Vec<DropdownOption>,
}

/// Accumulates per-field data from either representation and produces a
/// bundle with every invariant in place.
#[derive(Debug)]
pub struct BundleBuilder {
    screen_location: String,
    language_code: String,
    representation: SourceRepresentation,
    /// Drafts by dropdown key
    fields: HashMap<String, FieldDraft>,
    total_rows: usize,
}

impl BundleBuilder {
    /// Start a bundle
    #[must_use]
    pub fn new(
        screen_location: &str,
        language_code: &str,
        representation: SourceRepresentation,
    ) -> Self {
        Self {
            screen_location: screen_location.to_string(),
            language_code: language_code.to_string(),
            representation,
            fields: HashMap::new(),
            total_rows: 0,
        }
    }

    /// Record how many raw rows were read
    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
    }

    /// Replace a field wholesale (JSONB rows carry complete dropdowns)
    pub fn put_field(
        &mut self,
        field_name: &str,
        key: &str,
        label: String,
        placeholder: String,
        options: Vec<DropdownOption>,
    ) {
        self.fields.insert(
            key.to_string(),
            FieldDraft {
                field_name: field_name.to_string(),
                label,
                placeholder,
                options,
            },
        );
    }

    fn field(&mut self, field_name: &str, key: &str) -> &mut FieldDraft {
        self.fields
            .entry(key.to_string())
            .or_insert_with(|| FieldDraft {
                field_name: field_name.to_string(),
                ..FieldDraft::default()
            })
    }

    /// Set the label of a field (normalized rows arrive one piece at a time)
    pub fn set_label(&mut self, field_name: &str, key: &str, label: String) {
        self.field(field_name, key).label = label;
    }

    /// Set the placeholder of a field
    pub fn set_placeholder(&mut self, field_name: &str, key: &str, placeholder: String) {
        self.field(field_name, key).placeholder = placeholder;
    }

    /// Append an option to a field
    pub fn push_option(&mut self, field_name: &str, key: &str, option: DropdownOption) {
        self.field(field_name, key).options.push(option);
    }

    /// Order the options of every field with `order`
    pub fn sort_options_by<F>(&mut self, mut order: F)
    where
        F: FnMut(&DropdownOption, &DropdownOption) -> std::cmp::Ordering,
    {
        for draft in self.fields.values_mut() {
            draft.options.sort_by(&mut order);
        }
    }

    /// Freeze into a bundle
    #[must_use]
    pub fn build(self) -> DropdownBundle {
        let mut bundle = DropdownBundle::empty(
            self.screen_location,
            self.language_code,
            self.representation,
        );
        bundle.total_rows = self.total_rows;

        let mut drafts: Vec<(String, FieldDraft)> = self.fields.into_iter().collect();
        drafts.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, draft) in drafts {
            bundle.dropdowns.push(DropdownEntry {
                key: key.clone(),
                label: display_label(&draft.label, &draft.field_name),
            });
            for option in &draft.options {
                bundle
                    .flat_options
                    .insert(flat_option_key(&key, &option.value), option.text.clone());
            }
            bundle.labels_by_key.insert(key.clone(), draft.label);
            bundle
                .placeholders_by_key
                .insert(key.clone(), draft.placeholder);
            bundle.options_by_key.insert(key.clone(), draft.options);
            if let Some(previous) = bundle.fields.insert(draft.field_name.clone(), key.clone()) {
                warn!(
                    field_name = %draft.field_name,
                    previous = %previous,
                    dropdown_key = %key,
                    "Field name shared by two dropdowns, keeping the later key"
                );
            }
        }

        bundle
    }
}
