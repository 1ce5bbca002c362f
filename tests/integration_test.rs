//! Integration tests for Dropdeck
//!
//! These tests drive the resolver end to end against an in-memory SQLite
//! content database:
//! - dropdeck-store: schema, seeding and both query paths
//! - dropdeck-core: adapters, aliases, cache and migration

use async_trait::async_trait;
use dropdeck_core::{
    ContentRow, DropdownBundle, DropdownConfigRecord, DropdownMigrator, DropdownOption,
    DropdownResolver, DropdownSource, JsonbRow, ResolverConfig, SourceRepresentation,
};
use dropdeck_store::SqliteDropdownStore;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

/// Normalized content for two screens, English complete, Hebrew partial
async fn seed_normalized(store: &SqliteDropdownStore) {
    let items: &[(&str, &str, &str, &[(&str, &str)])] = &[
        (
            "mortgage_step1",
            "mortgage_step1_when",
            "dropdown_container",
            &[("en", "When do you need the mortgage?"), ("he", "מתי תזדקק למשכנתא?")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_when_ph",
            "placeholder",
            &[("en", "Select timeframe")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_when_option_1",
            "dropdown_option",
            &[("en", "Within 3 months"), ("he", "תוך 3 חודשים")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_when_option_2",
            "dropdown_option",
            &[("en", "3-6 months")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_when_option_10",
            "option",
            &[("en", "Not sure"), ("he", "לא בטוח")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_property_ownership",
            "label",
            &[("en", "Property Ownership"), ("he", "בעלות על נכס")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_property_ownership_no_property",
            "option",
            &[("en", "No property"), ("he", "אין נכס")],
        ),
        (
            "mortgage_step1",
            "mortgage_step1_property_ownership_has_property",
            "option",
            &[("en", "Own property")],
        ),
        (
            "mortgage_step2",
            "mortgage_step2_citizenship",
            "dropdown_container",
            &[("en", "Citizenship"), ("he", "אזרחות")],
        ),
        (
            "mortgage_step2",
            "mortgage_step2_citizenship_option_1",
            "dropdown_option",
            &[("en", "Israel"), ("he", "ישראל")],
        ),
        (
            "mortgage_step2",
            "mortgage_step2_citizenship_option_2",
            "dropdown_option",
            &[("en", "Other")],
        ),
    ];

    for (screen, key, component_type, translations) in items {
        store
            .insert_approved_content(screen, key, component_type, translations)
            .await
            .unwrap();
    }
}

async fn seeded_store() -> SqliteDropdownStore {
    let store = SqliteDropdownStore::in_memory().await.unwrap();
    seed_normalized(&store).await;
    store
}

fn resolver(store: &SqliteDropdownStore, representation: SourceRepresentation) -> DropdownResolver {
    DropdownResolver::new(
        Arc::new(store.clone()),
        ResolverConfig::default().with_representation(representation),
    )
}

/// Bundle with the diagnostics-only fields cleared
fn comparable(bundle: &DropdownBundle) -> DropdownBundle {
    DropdownBundle {
        source_representation: SourceRepresentation::Jsonb,
        total_rows: 0,
        ..bundle.clone()
    }
}

fn option_pairs(bundle: &DropdownBundle, key: &str) -> Vec<(String, String)> {
    bundle
        .options(key)
        .unwrap_or_default()
        .iter()
        .map(|o| (o.value.clone(), o.text.clone()))
        .collect()
}

/// Source that counts queries
struct CountingSource {
    inner: SqliteDropdownStore,
    queries: AtomicUsize,
}

#[async_trait]
impl DropdownSource for CountingSource {
    async fn fetch_dropdown_configs(&self, screen: &str) -> dropdeck_core::Result<Vec<JsonbRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_dropdown_configs(screen).await
    }

    async fn fetch_content_rows(
        &self,
        screen: &str,
        languages: &[String],
    ) -> dropdeck_core::Result<Vec<ContentRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_content_rows(screen, languages).await
    }

    async fn ping(&self) -> dropdeck_core::Result<()> {
        self.inner.ping().await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

// ============================================================================
// Normalized path
// ============================================================================

#[tokio::test]
async fn test_normalized_resolution_with_fallback() {
    let store = seeded_store().await;
    let resolution = resolver(&store, SourceRepresentation::Normalized)
        .resolve("mortgage_step1", "he")
        .await
        .unwrap();
    let bundle = resolution.bundle;

    assert_eq!(bundle.source_representation, SourceRepresentation::Normalized);
    assert_eq!(
        bundle.labels_by_key.get("mortgage_step1_when").unwrap(),
        "מתי תזדקק למשכנתא?"
    );
    // Placeholder only exists in English
    assert_eq!(
        bundle.placeholders_by_key.get("mortgage_step1_when").unwrap(),
        "Select timeframe"
    );
    assert_eq!(
        option_pairs(&bundle, "mortgage_step1_when"),
        vec![
            ("1".to_string(), "תוך 3 חודשים".to_string()),
            ("2".to_string(), "3-6 months".to_string()),
            ("10".to_string(), "לא בטוח".to_string()),
        ]
    );
    assert!(bundle
        .options_by_key
        .values()
        .flatten()
        .all(|o| !o.text.is_empty()));
}

#[tokio::test]
async fn test_property_ownership_example_on_both_paths() {
    let store = seeded_store().await;
    DropdownMigrator::new(Arc::new(store.clone()))
        .run(Some("mortgage_step1"))
        .await
        .unwrap();

    for representation in [SourceRepresentation::Jsonb, SourceRepresentation::Normalized] {
        let bundle = resolver(&store, representation)
            .resolve("mortgage_step1", "he")
            .await
            .unwrap()
            .bundle;

        let entry = bundle.dropdown("mortgage_step1_property_ownership").unwrap();
        assert_eq!(entry.label, "בעלות על נכס", "{representation}");
        assert_eq!(
            option_pairs(&bundle, "mortgage_step1_property_ownership"),
            vec![
                ("1".to_string(), "אין נכס".to_string()),
                ("2".to_string(), "Own property".to_string()),
            ],
            "{representation}"
        );
    }
}

// ============================================================================
// JSONB path
// ============================================================================

#[tokio::test]
async fn test_jsonb_concrete_example() {
    let store = SqliteDropdownStore::in_memory().await.unwrap();
    store
        .put_dropdown_config(
            &DropdownConfigRecord {
                dropdown_key: "mortgage_step1_property_ownership".into(),
                screen_location: "mortgage_step1".into(),
                field_name: "property_ownership".into(),
                dropdown_data: json!({
                    "label": {"en": "Property Ownership", "he": "בעלות על נכס"},
                    "options": [
                        {"value": "1", "text": {"en": "No property", "he": "אין נכס"}},
                        {"value": "2", "text": {"en": "Own property"}}
                    ]
                }),
            },
            true,
        )
        .await
        .unwrap();

    let bundle = resolver(&store, SourceRepresentation::Jsonb)
        .resolve("mortgage_step1", "he")
        .await
        .unwrap()
        .bundle;

    assert_eq!(bundle.dropdowns.len(), 1);
    assert_eq!(bundle.dropdowns[0].key, "mortgage_step1_property_ownership");
    assert_eq!(bundle.dropdowns[0].label, "בעלות על נכס");
    assert_eq!(
        bundle.options("mortgage_step1_property_ownership").unwrap(),
        &[
            DropdownOption {
                value: "1".into(),
                text: "אין נכס".into()
            },
            DropdownOption {
                value: "2".into(),
                text: "Own property".into()
            },
        ]
    );
    assert_eq!(
        bundle
            .flat_options
            .get("mortgage_step1_property_ownership_option_2")
            .unwrap(),
        "Own property"
    );
}

#[tokio::test]
async fn test_malformed_document_is_skipped() {
    let store = SqliteDropdownStore::in_memory().await.unwrap();
    for key in ["s_good", "s_broken"] {
        store
            .put_dropdown_config(
                &DropdownConfigRecord {
                    dropdown_key: key.into(),
                    screen_location: "s".into(),
                    field_name: key.trim_start_matches("s_").into(),
                    dropdown_data: json!({"label": {"en": "Label"}}),
                },
                true,
            )
            .await
            .unwrap();
    }
    store.set_raw_dropdown_data("s_broken", "not json").await.unwrap();

    let bundle = resolver(&store, SourceRepresentation::Jsonb)
        .resolve("s", "en")
        .await
        .unwrap()
        .bundle;
    let keys: Vec<&str> = bundle.dropdowns.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["s_good"]);
}

// ============================================================================
// Cross-representation properties
// ============================================================================

#[tokio::test]
async fn test_shape_equivalence_after_migration() {
    let store = seeded_store().await;
    // Hebrew-only content: untranslated for en and ru
    store
        .insert_approved_content(
            "mortgage_step1",
            "mortgage_step1_when_option_3",
            "dropdown_option",
            &[("he", "6-12 חודשים")],
        )
        .await
        .unwrap();
    store
        .insert_approved_content(
            "mortgage_step2",
            "mortgage_step2_family_status",
            "label",
            &[("he", "מצב משפחתי")],
        )
        .await
        .unwrap();
    store
        .insert_approved_content(
            "mortgage_step2",
            "mortgage_step2_family_status_option_1",
            "option",
            &[("he", "רווק")],
        )
        .await
        .unwrap();

    let report = DropdownMigrator::new(Arc::new(store.clone()))
        .run(None)
        .await
        .unwrap();
    assert_eq!(report.screens, 2);
    assert_eq!(report.dropdowns, 4);
    assert_eq!(report.inserted, 4);

    let jsonb = resolver(&store, SourceRepresentation::Jsonb);
    let normalized = resolver(&store, SourceRepresentation::Normalized);

    for screen in ["mortgage_step1", "mortgage_step2"] {
        for language in ["en", "he", "ru"] {
            let a = jsonb.resolve(screen, language).await.unwrap().bundle;
            let b = normalized.resolve(screen, language).await.unwrap().bundle;
            assert_eq!(comparable(&a), comparable(&b), "{screen}/{language}");
            assert_eq!(a.source_representation, SourceRepresentation::Jsonb);
            assert_eq!(b.source_representation, SourceRepresentation::Normalized);
            assert!(a.flat_options.values().all(|text| !text.is_empty()));
        }
    }

    let english = jsonb.resolve("mortgage_step1", "en").await.unwrap().bundle;
    assert!(!english.flat_options.contains_key("mortgage_step1_when_option_3"));
    let english = jsonb.resolve("mortgage_step2", "en").await.unwrap().bundle;
    assert!(!english.contains_key("mortgage_step2_family_status"));

    let hebrew = jsonb.resolve("mortgage_step2", "he").await.unwrap().bundle;
    assert_eq!(
        hebrew.labels_by_key.get("mortgage_step2_family_status").unwrap(),
        "מצב משפחתי"
    );
}

#[tokio::test]
async fn test_migration_is_repeatable_and_dry_run_writes_nothing() {
    let store = seeded_store().await;

    let dry = DropdownMigrator::new(Arc::new(store.clone()))
        .dry_run(true)
        .run(None)
        .await
        .unwrap();
    assert!(dry.dry_run);
    assert_eq!(dry.dropdowns, 3);
    assert_eq!(dry.inserted + dry.updated, 0);
    assert!(store.fetch_dropdown_configs("mortgage_step1").await.unwrap().is_empty());

    let first = DropdownMigrator::new(Arc::new(store.clone())).run(None).await.unwrap();
    let second = DropdownMigrator::new(Arc::new(store.clone())).run(None).await.unwrap();
    assert_eq!(first.inserted, 3);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 3);
}

#[tokio::test]
async fn test_citizenship_alias_on_both_paths() {
    let store = seeded_store().await;
    DropdownMigrator::new(Arc::new(store.clone()))
        .run(Some("mortgage_step2"))
        .await
        .unwrap();

    for representation in [SourceRepresentation::Jsonb, SourceRepresentation::Normalized] {
        let bundle = resolver(&store, representation)
            .resolve("mortgage_step2", "en")
            .await
            .unwrap()
            .bundle;
        assert_eq!(
            bundle.options_by_key.get("mortgage_step2_citizenship_countries"),
            bundle.options_by_key.get("mortgage_step2_citizenship"),
        );
        assert!(bundle.contains_key("mortgage_step2_citizenship_countries"));
        assert_eq!(
            bundle
                .flat_options
                .get("mortgage_step2_citizenship_countries_option_1")
                .unwrap(),
            "Israel"
        );
    }
}

#[tokio::test]
async fn test_when_needed_alias_on_step1() {
    let store = seeded_store().await;
    let bundle = resolver(&store, SourceRepresentation::Normalized)
        .resolve("mortgage_step1", "en")
        .await
        .unwrap()
        .bundle;

    assert_eq!(
        bundle.options("mortgage_step1_when_needed"),
        bundle.options("mortgage_step1_when")
    );
}

#[tokio::test]
async fn test_nonexistent_screen_is_empty() {
    let store = seeded_store().await;
    for representation in [SourceRepresentation::Jsonb, SourceRepresentation::Normalized] {
        let bundle = resolver(&store, representation)
            .resolve("nonexistent_screen", "en")
            .await
            .unwrap()
            .bundle;
        assert!(bundle.dropdowns.is_empty());
        assert!(bundle.options_by_key.is_empty());
        assert!(bundle.labels_by_key.is_empty());
        assert!(bundle.placeholders_by_key.is_empty());
    }
}

#[tokio::test]
async fn test_second_resolve_does_not_query_store() {
    let store = seeded_store().await;
    let source = Arc::new(CountingSource {
        inner: store,
        queries: AtomicUsize::new(0),
    });
    let resolver = DropdownResolver::new(
        Arc::clone(&source) as Arc<dyn DropdownSource>,
        ResolverConfig::default(),
    );

    let first = resolver.resolve("mortgage_step1", "he").await.unwrap();
    let second = resolver.resolve("mortgage_step1", "he").await.unwrap();

    assert_eq!(source.queries.load(Ordering::SeqCst), 1);
    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.bundle, second.bundle);

    resolver.invalidate("mortgage_step1", Some("he"));
    resolver.resolve("mortgage_step1", "he").await.unwrap();
    assert_eq!(source.queries.load(Ordering::SeqCst), 2);
}
