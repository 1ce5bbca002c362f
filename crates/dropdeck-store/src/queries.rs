//! SQL shared by the backends

use dropdeck_core::ContentRow;

/// Component types the dropdown queries select, as an SQL list
pub(crate) const DROPDOWN_COMPONENT_TYPES: &str =
    "'dropdown_container', 'dropdown_option', 'option', 'placeholder', 'label'";

/// Keep rows in `languages`; an empty slice keeps everything
pub(crate) fn retain_languages(rows: &mut Vec<ContentRow>, languages: &[String]) {
    if !languages.is_empty() {
        rows.retain(|row| languages.iter().any(|l| *l == row.language_code));
    }
}
