//! Dropdown API endpoints
//!
//! GET /api/dropdowns/:screen/:language - Resolved dropdowns for a screen
//!
//! The body flattens the bundle into the shape existing frontends read:
//! per-key option arrays and `{key}_option_{value}` strings side by side in
//! `options`, plus one object per field name at the top level.

use super::AppState;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use dropdeck_core::{DropdownBundle, Error, SourceRepresentation};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Top-level keys a field object must never overwrite
const RESERVED_KEYS: &[&str] = &[
    "status",
    "screen_location",
    "language_code",
    "dropdowns",
    "options",
    "placeholders",
    "labels",
    "cached",
    "jsonb_source",
    "performance",
    "message",
    "error",
];

/// Field name a dropdown is exposed under
fn field_name_of<'a>(bundle: &'a DropdownBundle, key: &'a str) -> &'a str {
    bundle
        .fields
        .iter()
        .find(|(_, k)| k.as_str() == key)
        .map(|(field, _)| field.as_str())
        .unwrap_or_else(|| {
            key.strip_prefix(bundle.screen_location.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|rest| !rest.is_empty())
                .unwrap_or(key)
        })
}

/// Build the success body for a resolved bundle
pub fn bundle_body(bundle: &DropdownBundle, cached: bool, generated_at: DateTime<Utc>) -> Value {
    let mut options = Map::new();
    for (key, text) in &bundle.flat_options {
        options.insert(key.clone(), Value::String(text.clone()));
    }
    for (key, list) in &bundle.options_by_key {
        options.insert(key.clone(), json!(list));
    }

    let mut body = Map::new();
    body.insert("status".into(), json!("success"));
    body.insert("screen_location".into(), json!(bundle.screen_location));
    body.insert("language_code".into(), json!(bundle.language_code));
    body.insert("dropdowns".into(), json!(bundle.dropdowns));
    body.insert("options".into(), Value::Object(options));
    body.insert("placeholders".into(), json!(bundle.placeholders_by_key));
    body.insert("labels".into(), json!(bundle.labels_by_key));
    body.insert("cached".into(), json!(cached));
    body.insert(
        "jsonb_source".into(),
        json!(bundle.source_representation == SourceRepresentation::Jsonb),
    );
    body.insert(
        "performance".into(),
        json!({
            "query_count": if cached { 0 } else { 1 },
            "source": bundle.source_representation.as_str(),
            "total_items": bundle.total_rows,
            "dropdowns_found": bundle.dropdowns.len(),
            "generated_at": generated_at.to_rfc3339(),
        }),
    );

    for entry in &bundle.dropdowns {
        let field = field_name_of(bundle, &entry.key);
        if RESERVED_KEYS.contains(&field) || body.contains_key(field) {
            continue;
        }
        body.insert(
            field.to_string(),
            json!({
                "label": bundle.labels_by_key.get(&entry.key).cloned().unwrap_or_default(),
                "placeholder": bundle.placeholders_by_key.get(&entry.key).cloned().unwrap_or_default(),
                "options": bundle.options(&entry.key).unwrap_or_default(),
            }),
        );
    }

    Value::Object(body)
}

/// Status code and body for a failed resolution.
///
/// The body keeps every collection key so clients can render without checks.
pub fn error_body(
    screen_location: &str,
    language_code: &str,
    representation: SourceRepresentation,
    error: &Error,
    expose_error: bool,
) -> (StatusCode, Value) {
    let (status, message) = match error {
        Error::InvalidScreen(_) => (StatusCode::BAD_REQUEST, "Invalid screen location"),
        Error::SourceUnavailable(_) | Error::Configuration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch dropdown configuration",
        ),
    };

    let mut body = json!({
        "status": "error",
        "message": message,
        "screen_location": screen_location,
        "language_code": language_code,
        "dropdowns": [],
        "options": {},
        "placeholders": {},
        "labels": {},
        "cached": false,
        "jsonb_source": representation == SourceRepresentation::Jsonb,
    });
    if expose_error {
        body["error"] = json!(error.to_string());
    }
    (status, body)
}

/// Get the resolved dropdowns of a screen
#[utoipa::path(
    get,
    path = "/api/dropdowns/{screen}/{language}",
    tag = "dropdowns",
    params(
        ("screen" = String, Path, description = "Screen location, e.g. mortgage_step1"),
        ("language" = String, Path, description = "Language code, e.g. en, he, ru")
    ),
    responses(
        (status = 200, description = "Dropdown bundle (empty collections for unknown screens)"),
        (status = 400, description = "Invalid screen location"),
        (status = 500, description = "Content database unavailable")
    )
)]
pub async fn get_dropdowns(
    Extension(state): Extension<AppState>,
    Path((screen, language)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
    match state.resolver.resolve(&screen, &language).await {
        Ok(resolution) => {
            debug!(
                screen = %screen,
                language = %resolution.bundle.language_code,
                cached = resolution.cache_hit,
                "Serving dropdowns"
            );
            let body = bundle_body(&resolution.bundle, resolution.cache_hit, Utc::now());
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            warn!(screen = %screen, language = %language, error = %e, "Dropdown request failed");
            let (status, body) = error_body(
                &screen,
                &language,
                state.resolver.representation(),
                &e,
                state.expose_errors(),
            );
            (status, Json(body))
        }
    }
}

/// Create dropdown routes
pub fn dropdowns_routes() -> Router {
    Router::new().route("/api/dropdowns/:screen/:language", get(get_dropdowns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{seeded_state, state_with, UnavailableSource};
    use dropdeck_core::bundle::BundleBuilder;
    use dropdeck_core::{DropdownOption, RuntimeEnvironment};
    use std::sync::Arc;

    fn sample_bundle() -> DropdownBundle {
        let mut builder =
            BundleBuilder::new("mortgage_step1", "en", SourceRepresentation::Normalized);
        builder.put_field(
            "when",
            "mortgage_step1_when",
            "When do you need the mortgage?".into(),
            "Select timeframe".into(),
            vec![
                DropdownOption {
                    value: "1".into(),
                    text: "Within 3 months".into(),
                },
                DropdownOption {
                    value: "2".into(),
                    text: "3-6 months".into(),
                },
            ],
        );
        builder.put_field("status", "mortgage_step1_status", "Status".into(), String::new(), vec![]);
        builder.set_total_rows(5);
        builder.build()
    }

    #[test]
    fn test_bundle_body_shape() {
        let body = bundle_body(&sample_bundle(), false, Utc::now());

        assert_eq!(body["status"], "success");
        assert_eq!(body["jsonb_source"], false);
        assert_eq!(body["cached"], false);
        assert_eq!(body["dropdowns"][0]["key"], "mortgage_step1_status");
        assert_eq!(body["options"]["mortgage_step1_when"][1]["text"], "3-6 months");
        assert_eq!(body["options"]["mortgage_step1_when_option_1"], "Within 3 months");
        assert_eq!(body["placeholders"]["mortgage_step1_when"], "Select timeframe");
        assert_eq!(body["labels"]["mortgage_step1_when"], "When do you need the mortgage?");
        assert_eq!(body["when"]["placeholder"], "Select timeframe");
        assert_eq!(body["when"]["options"].as_array().unwrap().len(), 2);
        assert_eq!(body["performance"]["total_items"], 5);
        assert_eq!(body["performance"]["dropdowns_found"], 2);
        assert_eq!(body["performance"]["query_count"], 1);
    }

    #[test]
    fn test_reserved_field_names_not_overwritten() {
        let body = bundle_body(&sample_bundle(), true, Utc::now());
        // "status" is both a field name and a top-level key
        assert_eq!(body["status"], "success");
        assert_eq!(body["performance"]["query_count"], 0);
        assert!(body["options"]["mortgage_step1_status"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_error_body_keeps_shape() {
        let err = Error::SourceUnavailable("connection refused".into());
        let (status, body) =
            error_body("mortgage_step1", "en", SourceRepresentation::Jsonb, &err, false);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert!(body["dropdowns"].as_array().unwrap().is_empty());
        assert!(body["options"].as_object().unwrap().is_empty());
        assert!(body["placeholders"].as_object().unwrap().is_empty());
        assert!(body["labels"].as_object().unwrap().is_empty());
        assert!(body.get("error").is_none());

        let (status, body) = error_body(
            " ",
            "en",
            SourceRepresentation::Jsonb,
            &Error::InvalidScreen(" ".into()),
            true,
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_get_dropdowns_served_then_cached() {
        let state = seeded_state().await;

        let (status, Json(first)) = get_dropdowns(
            Extension(state.clone()),
            Path(("mortgage_step2".to_string(), "en".to_string())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["cached"], false);
        assert_eq!(first["jsonb_source"], true);
        assert_eq!(
            first["options"]["mortgage_step2_citizenship_countries"],
            first["options"]["mortgage_step2_citizenship"]
        );
        assert_eq!(first["citizenship"]["label"], "Citizenship");
        assert_eq!(first["citizenship_countries"]["options"][0]["text"], "Israel");

        let (_, Json(second)) = get_dropdowns(
            Extension(state),
            Path(("mortgage_step2".to_string(), "en".to_string())),
        )
        .await;
        assert_eq!(second["cached"], true);
    }

    #[tokio::test]
    async fn test_get_dropdowns_unknown_screen_is_empty_success() {
        let state = seeded_state().await;
        let (status, Json(body)) = get_dropdowns(
            Extension(state),
            Path(("nonexistent_screen".to_string(), "en".to_string())),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert!(body["dropdowns"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_dropdowns_source_failure() {
        let state = state_with(Arc::new(UnavailableSource), true, RuntimeEnvironment::Production);
        let (status, Json(body)) = get_dropdowns(
            Extension(state),
            Path(("mortgage_step1".to_string(), "en".to_string())),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert!(body.get("error").is_none());
        assert!(body["options"].as_object().unwrap().is_empty());
    }
}
