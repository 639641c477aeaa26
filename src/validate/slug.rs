//! Heading text to anchor slug.

/// Convert heading text into the anchor renderers generate for it.
///
/// Lowercase, trim, drop everything except word characters, whitespace and
/// `-`, collapse runs of whitespace, `_` and `-` into one `-`, then strip
/// leading and trailing `-`.
///
/// ```
/// use docgraph::validate::slugify;
/// assert_eq!(slugify("## Getting Started"), "getting-started");
/// assert_eq!(slugify("API: v2 (beta)"), "api-v2-beta");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for c in lowered.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_sep = true;
        } else if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        }
        // Anything else is dropped without breaking the current run.
    }

    slug
}
