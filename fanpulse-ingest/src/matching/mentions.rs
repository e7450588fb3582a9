//! `@handle` extraction

use once_cell::sync::Lazy;
use regex::Regex;

/// `@` followed by letters, digits, underscores or dots
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@([\p{L}\p{N}_.]+)").expect("mention pattern is valid")
});

/// Every mention in `text`, left to right, without the leading `@`.
///
/// Duplicates are kept. Missing or empty text yields no mentions.
pub fn extract_mentions(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_order_with_duplicates() {
        let mentions = extract_mentions(Some("@monlaferte y @nathy.peluso con @monlaferte!"));
        assert_eq!(mentions, vec!["monlaferte", "nathy.peluso", "monlaferte"]);
    }

    #[test]
    fn test_stops_at_disallowed_characters() {
        assert_eq!(extract_mentions(Some("hola @dopecameron_, bye")), vec!["dopecameron_"]);
        assert_eq!(extract_mentions(Some("@ha-ash")), vec!["ha"]);
    }

    #[test]
    fn test_accented_handles() {
        assert_eq!(extract_mentions(Some("con @beéle")), vec!["beéle"]);
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(extract_mentions(None).is_empty());
        assert!(extract_mentions(Some("")).is_empty());
        assert!(extract_mentions(Some("no handles @ here")).is_empty());
    }

    #[test]
    fn test_email_like_text() {
        // the token after @ is still a mention
        assert_eq!(extract_mentions(Some("booking@sonymusic.com")), vec!["sonymusic.com"]);
    }
}
