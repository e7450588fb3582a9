//! Matching strategies
//!
//! Each strategy looks at one caption and either commits to an artist or has
//! no opinion. The matcher evaluates them in a fixed order and stops at the
//! first commitment, so the cheap, precise rules run before the fuzzy ones.

use super::mentions::extract_mentions;
use super::overrides::OverrideTable;
use crate::roster::Roster;
use fanpulse_common::text::normalize;
use fanpulse_common::{Artist, MatchMethod};

/// Confidence for every rule-based (non-fuzzy) match
pub const RULE_CONFIDENCE: f64 = 1.0;

/// Score assigned when a normalized artist name occurs inside the caption
pub const SUBSTRING_SCORE: f64 = 0.85;

/// Shorter side of a mention/artist containment must exceed this many chars
pub const CONTAINMENT_MIN_CHARS: usize = 3;

/// Normalized artist must exceed this many chars for the substring fallback
pub const SUBSTRING_MIN_CHARS: usize = 4;

/// Name words must exceed this many chars to count toward coverage
pub const COVERAGE_MIN_WORD_CHARS: usize = 2;

/// Fraction of name words that must appear for a partial-coverage match
pub const COVERAGE_MIN_FRACTION: f64 = 0.7;

/// Edit-distance similarity of two strings in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// An `@handle` in three comparison forms
#[derive(Debug, Clone)]
pub struct Mention {
    pub raw: String,
    pub lower: String,
    pub normalized: String,
}

/// A caption prepared once for every strategy
#[derive(Debug, Clone)]
pub struct Caption<'a> {
    pub text: &'a str,
    pub lower: String,
    pub normalized: String,
    pub mentions: Vec<Mention>,
}

impl<'a> Caption<'a> {
    pub fn new(text: &'a str) -> Self {
        let mentions = extract_mentions(Some(text))
            .into_iter()
            .map(|raw| Mention {
                lower: raw.to_lowercase(),
                normalized: normalize(&raw),
                raw,
            })
            .collect();

        Self {
            text,
            lower: text.to_lowercase(),
            normalized: normalize(text),
            mentions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Shared read-only inputs for one evaluation
pub struct MatchContext<'a> {
    pub caption: &'a Caption<'a>,
    pub roster: &'a Roster,
    pub overrides: &'a OverrideTable,
}

/// A strategy's commitment
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub artist: Artist,
    pub confidence: f64,
    pub method: MatchMethod,
}

impl Candidate {
    fn rule(artist: &Artist, method: MatchMethod) -> Self {
        Self {
            artist: artist.clone(),
            confidence: RULE_CONFIDENCE,
            method,
        }
    }
}

/// One rule in the attribution cascade
pub trait MatchStrategy: Send + Sync {
    /// Method recorded when this strategy commits
    fn method(&self) -> MatchMethod;

    /// `Some` to commit, `None` for no opinion
    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate>;
}

/// Override table consulted for each mention; first hit wins
pub struct OverrideOnMention;

impl MatchStrategy for OverrideOnMention {
    fn method(&self) -> MatchMethod {
        MatchMethod::Override
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        ctx.caption
            .mentions
            .iter()
            .find_map(|m| ctx.overrides.resolve(&m.raw))
            .map(|target| Candidate::rule(ctx.roster.canonical(target), self.method()))
    }
}

/// Lowercased mention equals the lowercased artist name
pub struct ExactMention;

impl MatchStrategy for ExactMention {
    fn method(&self) -> MatchMethod {
        MatchMethod::ExactMention
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        for mention in &ctx.caption.mentions {
            for artist in ctx.roster.iter() {
                if mention.lower == artist.name().to_lowercase() {
                    return Some(Candidate::rule(artist, self.method()));
                }
            }
        }
        None
    }
}

/// Normalized mention contains the normalized artist, or the reverse
pub struct MentionContainment;

impl MatchStrategy for MentionContainment {
    fn method(&self) -> MatchMethod {
        MatchMethod::MentionContainment
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        for mention in &ctx.caption.mentions {
            let handle = mention.normalized.as_str();
            for artist in ctx.roster.iter() {
                let key = artist.key();
                let shorter = handle.chars().count().min(key.chars().count());
                if shorter <= CONTAINMENT_MIN_CHARS {
                    continue;
                }
                if handle.contains(key) || key.contains(handle) {
                    return Some(Candidate::rule(artist, self.method()));
                }
            }
        }
        None
    }
}

/// Full artist name appears in the caption as whole words
pub struct WholeWord;

impl MatchStrategy for WholeWord {
    fn method(&self) -> MatchMethod {
        MatchMethod::WholeWord
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        ctx.roster
            .iter()
            .find(|artist| contains_whole_word(&ctx.caption.lower, &artist.name().to_lowercase()))
            .map(|artist| Candidate::rule(artist, self.method()))
    }
}

/// Most words of a multi-word name appear somewhere in the caption
pub struct PartialCoverage;

impl PartialCoverage {
    fn covers(caption_lower: &str, artist: &Artist) -> bool {
        let name = artist.name().to_lowercase();
        let words: Vec<&str> = name.split_whitespace().collect();
        if words.len() <= 1 {
            return false;
        }

        let found = words
            .iter()
            .filter(|w| w.chars().count() > COVERAGE_MIN_WORD_CHARS && caption_lower.contains(*w))
            .count();

        found as f64 >= words.len() as f64 * COVERAGE_MIN_FRACTION
    }
}

impl MatchStrategy for PartialCoverage {
    fn method(&self) -> MatchMethod {
        MatchMethod::PartialCoverage
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        ctx.roster
            .iter()
            .find(|artist| Self::covers(&ctx.caption.lower, artist))
            .map(|artist| Candidate::rule(artist, self.method()))
    }
}

/// Best edit-distance similarity across every (mention, artist) pair, with
/// the normalized-substring fallback scored at `SUBSTRING_SCORE`.
///
/// Commits only when the best score reaches `threshold` (inclusive). Ties keep
/// the earlier roster artist.
pub struct FuzzySimilarity {
    pub threshold: f64,
}

impl FuzzySimilarity {
    /// Best-scoring candidate regardless of threshold
    pub fn best(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        let mut best_score = 0.0;

        for artist in ctx.roster.iter() {
            let key = artist.key();

            for mention in &ctx.caption.mentions {
                if mention.normalized.is_empty() {
                    continue;
                }
                let score = similarity(key, &mention.normalized);
                if score > best_score {
                    best_score = score;
                    best = Some(Candidate {
                        artist: artist.clone(),
                        confidence: score,
                        method: MatchMethod::FuzzyMention,
                    });
                }
            }

            if key.chars().count() > SUBSTRING_MIN_CHARS
                && ctx.caption.normalized.contains(key)
                && SUBSTRING_SCORE > best_score
            {
                best_score = SUBSTRING_SCORE;
                best = Some(Candidate {
                    artist: artist.clone(),
                    confidence: SUBSTRING_SCORE,
                    method: MatchMethod::NormalizedSubstring,
                });
            }
        }

        best
    }
}

impl MatchStrategy for FuzzySimilarity {
    fn method(&self) -> MatchMethod {
        MatchMethod::FuzzyMention
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<Candidate> {
        self.best(ctx).filter(|c| c.confidence >= self.threshold)
    }
}

/// The standard cascade, in evaluation order
pub fn default_cascade(threshold: f64) -> Vec<Box<dyn MatchStrategy>> {
    vec![
        Box::new(OverrideOnMention),
        Box::new(ExactMention),
        Box::new(MentionContainment),
        Box::new(WholeWord),
        Box::new(PartialCoverage),
        Box::new(FuzzySimilarity { threshold }),
    ]
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `needle` occurs in `haystack` not glued to a larger word.
///
/// Boundaries are only enforced at needle ends that are themselves word
/// characters, so names with leading/trailing punctuation still match.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let starts_with_word = needle.chars().next().is_some_and(is_word_char);
    let ends_with_word = needle.chars().next_back().is_some_and(is_word_char);

    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();

        let before_ok = !starts_with_word
            || haystack[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = !ends_with_word
            || haystack[end..].chars().next().map_or(true, |c| !is_word_char(c));

        if before_ok && after_ok {
            return true;
        }

        // advance one char so overlapping occurrences are still seen
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_eval(strategy: &dyn MatchStrategy, text: &str, roster: &Roster) -> Option<Candidate> {
        let overrides = OverrideTable::empty();
        let caption = Caption::new(text);
        let ctx = MatchContext {
            caption: &caption,
            roster,
            overrides: &overrides,
        };
        strategy.evaluate(&ctx)
    }

    #[test]
    fn test_caption_prepares_forms() {
        let caption = Caption::new("Hola @Nathy.Peluso!");
        assert_eq!(caption.lower, "hola @nathy.peluso!");
        assert_eq!(caption.normalized, "holanathypeluso");
        assert_eq!(caption.mentions.len(), 1);
        assert_eq!(caption.mentions[0].raw, "Nathy.Peluso");
        assert_eq!(caption.mentions[0].normalized, "nathypeluso");
    }

    #[test]
    fn test_exact_mention() {
        let roster = Roster::from_names(["Karol G", "Danna"]);
        let c = ctx_eval(&ExactMention, "con @DANNA hoy", &roster).unwrap();
        assert_eq!(c.artist.name(), "Danna");
        assert_eq!(c.method, MatchMethod::ExactMention);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_mention_containment_both_directions() {
        let roster = Roster::from_names(["Mon Laferte"]);
        let c = ctx_eval(&MentionContainment, "@monlaferteoficial", &roster).unwrap();
        assert_eq!(c.artist.name(), "Mon Laferte");

        let roster = Roster::from_names(["Natalia Lafourcade"]);
        assert!(ctx_eval(&MentionContainment, "@lafourcade", &roster).is_some());
    }

    #[test]
    fn test_mention_containment_requires_long_shorter_side() {
        // "mon" is inside "monlaferte" but only 3 chars long
        let roster = Roster::from_names(["Mon Laferte"]);
        assert!(ctx_eval(&MentionContainment, "@mon", &roster).is_none());
    }

    #[test]
    fn test_whole_word_match() {
        let roster = Roster::from_names(["Ha*Ash"]);
        assert!(ctx_eval(&WholeWord, "Ha*Ash en vivo", &roster).is_some());
        assert!(ctx_eval(&WholeWord, "I love Ha", &roster).is_none());
    }

    #[test]
    fn test_whole_word_rejects_embedded_name() {
        let roster = Roster::from_names(["Danna"]);
        assert!(ctx_eval(&WholeWord, "gran dannasound tour", &roster).is_none());
        assert!(ctx_eval(&WholeWord, "gran concierto de danna, cdmx", &roster).is_some());
    }

    #[test]
    fn test_contains_whole_word_overlapping() {
        assert!(contains_whole_word("ananas ana", "ana"));
        assert!(!contains_whole_word("ananas", "ana"));
        assert!(contains_whole_word("¡p!nk!", "p!nk"));
        assert!(!contains_whole_word("anything", ""));
    }

    #[test]
    fn test_partial_coverage() {
        let roster = Roster::from_names(["Carlos Rivera"]);
        let c = ctx_eval(&PartialCoverage, "rivera y carlos en el escenario", &roster).unwrap();
        assert_eq!(c.method, MatchMethod::PartialCoverage);

        // one of two words is 50%, below 70%
        assert!(ctx_eval(&PartialCoverage, "solo carlos", &roster).is_none());
    }

    #[test]
    fn test_partial_coverage_ignores_single_word_names() {
        let roster = Roster::from_names(["Danna"]);
        assert!(ctx_eval(&PartialCoverage, "danna", &roster).is_none());
    }

    #[test]
    fn test_fuzzy_picks_best_pair() {
        let roster = Roster::from_names(["Abcdef", "Abcxyz"]);
        let strategy = FuzzySimilarity { threshold: 0.5 };
        let c = ctx_eval(&strategy, "@abcdeq", &roster).unwrap();
        assert_eq!(c.artist.name(), "Abcdef");
        assert_eq!(c.method, MatchMethod::FuzzyMention);
        assert!((c.confidence - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_substring_fallback() {
        let roster = Roster::from_names(["Neto Bernal"]);
        let strategy = FuzzySimilarity { threshold: 0.75 };
        let c = ctx_eval(&strategy, "nuevo video de NETO-BERNAL!!", &roster).unwrap();
        assert_eq!(c.method, MatchMethod::NormalizedSubstring);
        assert_eq!(c.confidence, SUBSTRING_SCORE);
    }

    #[test]
    fn test_substring_fallback_needs_long_name() {
        let roster = Roster::from_names(["Abce"]);
        let strategy = FuzzySimilarity { threshold: 0.1 };
        assert!(ctx_eval(&strategy, "xxabcexx", &roster).is_none());
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("abcd", "abcd"), 1.0);
        assert_eq!(similarity("abcd", "abce"), 0.75);
        assert_eq!(similarity("abcd", "wxyz"), 0.0);
    }
}
