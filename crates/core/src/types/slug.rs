//! Stable identifiers derived from display names.

/// Convert a display name to a lowercase, hyphen-separated identifier.
///
/// Word characters are kept, whitespace and hyphen runs collapse into a single
/// `-`, everything else is dropped, and leading/trailing `-` and `_` are
/// stripped.
///
/// ```
/// use product_variations_core::slugify;
///
/// assert_eq!(slugify("Extra Large"), "extra-large");
/// assert_eq!(slugify("  Red / Blue  "), "red-blue");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_owned()
}
