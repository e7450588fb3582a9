//! Text comparison primitives shared by the matcher and the export layer

/// Normalize text for comparison.
///
/// Drops every character that is not alphanumeric and lower-cases the
/// remainder. Accented letters are alphanumeric, so they survive (lower-cased)
/// rather than being folded to ASCII.
///
/// # Examples
///
/// ```
/// use fanpulse_common::text::normalize;
///
/// assert_eq!(normalize("Ha*Ash"), "haash");
/// assert_eq!(normalize("@Dove.Cameron_"), "dovecameron");
/// assert_eq!(normalize("BEÉLE"), "beéle");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
