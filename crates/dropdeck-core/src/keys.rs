//! Content-key heuristics for the normalized representation.
//!
//! Normalized rows carry no explicit dropdown or option identifiers; both are
//! recovered from the content key. The rules live here, as pure functions over
//! explicit tables, so their scope is visible and testable on its own.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Suffixes stripped, in order, to get from a content key to its field key.
const FIELD_SUFFIXES: &[&str] = &["_ph", "_has_property", "_no_property", "_selling_property"];

/// Legacy property-ownership keys that encode their option value by name.
/// Checked before any other rule.
pub const SPECIAL_OPTION_VALUES: &[(&str, &str)] = &[
    ("_no_property", "1"),
    ("_has_property", "2"),
    ("_selling_property", "3"),
];

/// Value used when a key yields no usable trailing segment
const FALLBACK_OPTION_VALUE: &str = "1";

fn numbered_option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_option_(\d+)$").expect("valid regex"))
}

/// Derive the field key (dropdown key) a content key belongs to.
///
/// `mortgage_step1_when_option_2` and `mortgage_step1_when_ph` both map to
/// `mortgage_step1_when`. Characters outside `[A-Za-z0-9_]` become `_`.
#[must_use]
pub fn derive_field_key(content_key: &str) -> String {
    let mut base = numbered_option_re().replace(content_key, "").into_owned();
    for suffix in FIELD_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(suffix) {
            base = stripped.to_string();
        }
    }

    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Recover an option value from a content key.
///
/// Rules, first match wins:
/// 1. a suffix from [`SPECIAL_OPTION_VALUES`] anywhere in the key
/// 2. `_option_<digits>` at the end of the key, yielding the digits
/// 3. the trailing `_`-separated segment
/// 4. `"1"` when that segment is empty
#[must_use]
pub fn derive_option_value(content_key: &str) -> String {
    if let Some((_, value)) = SPECIAL_OPTION_VALUES
        .iter()
        .find(|(suffix, _)| content_key.contains(suffix))
    {
        return (*value).to_string();
    }

    if let Some(caps) = numbered_option_re().captures(content_key) {
        return caps[1].to_string();
    }

    match content_key.rsplit('_').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => FALLBACK_OPTION_VALUE.to_string(),
    }
}

/// Field name for a dropdown key: the key without its `{screen}_` prefix.
#[must_use]
pub fn field_name_for(screen_location: &str, key: &str) -> String {
    key.strip_prefix(screen_location)
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(key)
        .to_string()
}

/// Option ordering: integer values ascending, everything else after them in
/// its original order (use with a stable sort).
#[must_use]
pub fn compare_option_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_strips_suffixes() {
        assert_eq!(
            derive_field_key("mortgage_step1_when_option_2"),
            "mortgage_step1_when"
        );
        assert_eq!(derive_field_key("mortgage_step1_when_ph"), "mortgage_step1_when");
        assert_eq!(derive_field_key("mortgage_step1_when"), "mortgage_step1_when");
        assert_eq!(
            derive_field_key("mortgage_step1_property_ownership_no_property"),
            "mortgage_step1_property_ownership"
        );
    }

    #[test]
    fn test_field_key_sanitizes() {
        assert_eq!(derive_field_key("app.mortgage.step1-when"), "app_mortgage_step1_when");
    }

    #[test]
    fn test_option_value_special_cases() {
        assert_eq!(derive_option_value("step1_ownership_no_property"), "1");
        assert_eq!(derive_option_value("step1_ownership_has_property"), "2");
        assert_eq!(derive_option_value("step1_ownership_selling_property"), "3");
    }

    #[test]
    fn test_option_value_numbered_and_fallbacks() {
        assert_eq!(derive_option_value("mortgage_step1_when_option_12"), "12");
        assert_eq!(derive_option_value("family_status_married"), "married");
        assert_eq!(derive_option_value("family_status_"), "1");
        assert_eq!(derive_option_value("single"), "single");
    }

    #[test]
    fn test_field_name_for() {
        assert_eq!(
            field_name_for("mortgage_step1", "mortgage_step1_property_ownership"),
            "property_ownership"
        );
        assert_eq!(field_name_for("mortgage_step1", "mortgage_step1"), "mortgage_step1");
        assert_eq!(field_name_for("mortgage_step1", "other_key"), "other_key");
        assert_eq!(field_name_for("mortgage_step1", "mortgage_step10_x"), "mortgage_step10_x");
    }

    #[test]
    fn test_compare_option_values() {
        let mut values = vec!["10", "b", "2", "a", "1"];
        values.sort_by(|a, b| compare_option_values(a, b));
        assert_eq!(values, vec!["1", "2", "10", "b", "a"]);
    }
}
