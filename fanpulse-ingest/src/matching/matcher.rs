//! Artist Matcher
//!
//! Runs the strategy cascade over a caption and turns the first commitment
//! into an `Attribution`, then lets the override table correct the decided
//! artist. Matching only reads the roster and override table, so one matcher
//! can classify posts from many threads at once.

use super::overrides::OverrideTable;
use super::strategies::{default_cascade, Caption, MatchContext, MatchStrategy};
use crate::roster::Roster;
use fanpulse_common::config::{MatchingConfig, DEFAULT_MATCH_THRESHOLD};
use fanpulse_common::Attribution;
use tracing::debug;

pub struct ArtistMatcher {
    roster: Roster,
    overrides: OverrideTable,
    strategies: Vec<Box<dyn MatchStrategy>>,
    threshold: f64,
}

impl ArtistMatcher {
    /// Matcher with the standard cascade.
    ///
    /// Override targets are appended to the roster so every attribution is a
    /// roster member.
    pub fn new(roster: Roster, overrides: OverrideTable, threshold: f64) -> Self {
        let roster = roster.with_override_targets(&overrides);
        Self {
            roster,
            overrides,
            strategies: default_cascade(threshold),
            threshold,
        }
    }

    /// Matcher configured from the `[matching]` section
    pub fn from_config(roster: Roster, overrides: OverrideTable, config: &MatchingConfig) -> Self {
        let overrides = overrides.with_policy(config.override_policy);
        Self::new(roster, overrides, config.threshold)
    }

    /// Matcher with the built-in overrides and default threshold
    pub fn with_defaults(roster: Roster) -> Self {
        Self::new(roster, OverrideTable::builtin(), DEFAULT_MATCH_THRESHOLD)
    }

    /// Replace the cascade
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn MatchStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Attribute a caption to a roster artist.
    ///
    /// Empty or missing captions are unattributed without running any
    /// strategy.
    pub fn attribute(&self, description: Option<&str>) -> Attribution {
        let Some(text) = description else {
            return Attribution::Unattributed;
        };
        let caption = Caption::new(text);
        if caption.is_empty() {
            return Attribution::Unattributed;
        }

        let ctx = MatchContext {
            caption: &caption,
            roster: &self.roster,
            overrides: &self.overrides,
        };

        let Some(candidate) = self.strategies.iter().find_map(|s| s.evaluate(&ctx)) else {
            return Attribution::Unattributed;
        };

        let (artist, corrected) = match self.overrides.correct(&candidate.artist) {
            Some(target) => {
                let target = self.roster.canonical(target);
                debug!(
                    from = %candidate.artist,
                    to = %target,
                    "Override corrected matched artist"
                );
                (target.clone(), true)
            }
            None => (candidate.artist, false),
        };

        Attribution::Attributed {
            artist,
            confidence: candidate.confidence,
            method: candidate.method,
            corrected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::strategies::{ExactMention, WholeWord};
    use fanpulse_common::MatchMethod;

    fn roster() -> Roster {
        Roster::from_names([
            "Mon Laferte",
            "Nathy Peluso",
            "Carlos Rivera",
            "Ha*Ash",
            "Camilo",
            "Danna",
        ])
    }

    #[test]
    fn test_override_precedence_on_mention() {
        let matcher = ArtistMatcher::with_defaults(roster());
        let attribution = matcher.attribute(Some("collab con @dopecameron_"));

        assert_eq!(attribution.artist().unwrap().name(), "Dove Cameron");
        assert_eq!(attribution.confidence(), 1.0);
        assert_eq!(attribution.method(), MatchMethod::Override);
    }

    #[test]
    fn test_override_precedence_without_target_in_roster() {
        let matcher = ArtistMatcher::with_defaults(Roster::from_names(["Camilo"]));
        let attribution = matcher.attribute(Some("@dopecameron_ y @camilo"));
        assert_eq!(attribution.artist().unwrap().name(), "Dove Cameron");
        assert!(matcher.roster().get("Dove Cameron").is_some());
    }

    #[test]
    fn test_empty_and_missing_descriptions() {
        let matcher = ArtistMatcher::with_defaults(roster());
        assert_eq!(matcher.attribute(None), Attribution::Unattributed);
        assert_eq!(matcher.attribute(Some("")), Attribution::Unattributed);
        assert_eq!(matcher.attribute(Some("   ")), Attribution::Unattributed);
    }

    #[test]
    fn test_no_mentions_no_names_is_unattributed() {
        let matcher = ArtistMatcher::with_defaults(roster());
        let attribution = matcher.attribute(Some("¡Gracias por todo el apoyo!"));
        assert_eq!(attribution, Attribution::Unattributed);
        assert_eq!(attribution.confidence(), 0.0);
    }

    #[test]
    fn test_whole_word_boundary() {
        let matcher = ArtistMatcher::new(roster(), OverrideTable::empty(), 0.75);
        assert_eq!(matcher.attribute(Some("I love Ha")), Attribution::Unattributed);

        let attribution = matcher.attribute(Some("Ha*Ash en vivo"));
        assert_eq!(attribution.artist().unwrap().name(), "Ha*Ash");
        assert_eq!(attribution.method(), MatchMethod::WholeWord);
    }

    #[test]
    fn test_cascade_order_exact_before_containment() {
        // "@camilo" equals "Camilo" exactly; containment would also fire
        let matcher = ArtistMatcher::new(roster(), OverrideTable::empty(), 0.75);
        let attribution = matcher.attribute(Some("nuevo tema @camilo"));
        assert_eq!(attribution.method(), MatchMethod::ExactMention);
    }

    #[test]
    fn test_threshold_boundary_inclusive() {
        let roster = Roster::from_names(["Abce"]);

        let at = ArtistMatcher::new(roster.clone(), OverrideTable::empty(), 0.75);
        let attribution = at.attribute(Some("@abcd"));
        assert_eq!(attribution.artist().unwrap().name(), "Abce");
        assert_eq!(attribution.confidence(), 0.75);
        assert_eq!(attribution.method(), MatchMethod::FuzzyMention);

        let above = ArtistMatcher::new(roster, OverrideTable::empty(), 0.76);
        let attribution = above.attribute(Some("@abcd"));
        assert_eq!(attribution, Attribution::Unattributed);
        assert_eq!(attribution.confidence(), 0.0);
    }

    #[test]
    fn test_post_hoc_correction() {
        // "Haim" is a roster artist, but the override table maps it to Ha*Ash
        let matcher = ArtistMatcher::with_defaults(Roster::from_names(["Haim"]));
        match matcher.attribute(Some("Haim live in Mexico City")) {
            Attribution::Attributed {
                artist,
                method,
                corrected,
                ..
            } => {
                assert_eq!(artist.name(), "Ha*Ash");
                assert_eq!(method, MatchMethod::WholeWord);
                assert!(corrected);
            }
            Attribution::Unattributed => panic!("expected an attribution"),
        }
    }

    #[test]
    fn test_override_uses_roster_spelling() {
        let matcher = ArtistMatcher::with_defaults(Roster::from_names(["HA ASH"]));

        let by_name = matcher.attribute(Some("HA ASH en vivo"));
        let by_override = matcher.attribute(Some("@haim_oficial"));

        assert_eq!(by_name.artist().unwrap().name(), "HA ASH");
        assert_eq!(by_override.method(), MatchMethod::Override);
        assert_eq!(by_override.artist().unwrap().name(), "HA ASH");
        assert!(matcher.roster().iter().all(|a| a.name() != "Ha*Ash"));
    }

    #[test]
    fn test_correction_uses_roster_spelling() {
        let matcher = ArtistMatcher::with_defaults(Roster::from_names(["Haim", "HA ASH"]));
        match matcher.attribute(Some("Haim live in Mexico City")) {
            Attribution::Attributed { artist, corrected, .. } => {
                assert_eq!(artist.name(), "HA ASH");
                assert!(corrected);
            }
            Attribution::Unattributed => panic!("expected an attribution"),
        }
    }

    #[test]
    fn test_deterministic() {
        let matcher = ArtistMatcher::with_defaults(roster());
        let text = Some("@nathy_p con @monlaferte en vivo");
        assert_eq!(matcher.attribute(text), matcher.attribute(text));
    }

    #[test]
    fn test_custom_cascade() {
        let matcher = ArtistMatcher::new(roster(), OverrideTable::empty(), 0.75)
            .with_strategies(vec![Box::new(ExactMention), Box::new(WholeWord)]);
        // containment would match "@monlaferteoficial" but is not in the cascade
        assert_eq!(matcher.attribute(Some("@monlaferteoficial")), Attribution::Unattributed);
        assert!(matcher.attribute(Some("danna")).is_attributed());
    }

    #[test]
    fn test_from_config_applies_policy() {
        let config = MatchingConfig {
            threshold: 0.6,
            override_policy: fanpulse_common::config::OverridePolicy::LongestKey,
            ..Default::default()
        };
        let matcher = ArtistMatcher::from_config(roster(), OverrideTable::builtin(), &config);
        assert_eq!(matcher.threshold(), 0.6);
        assert_eq!(
            matcher.overrides().policy(),
            fanpulse_common::config::OverridePolicy::LongestKey
        );
    }
}
