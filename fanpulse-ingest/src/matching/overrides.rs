//! Curated artist overrides
//!
//! Some handles defeat every generic rule (truncated, misspelled, or shared
//! with an unrelated word). The override table maps a short lowercase key
//! fragment to the artist it really means.
//!
//! The table is an ordered list, not a map: when several keys occur in one
//! candidate, `OverridePolicy::FirstInOrder` picks the earliest rule, so rule
//! order is part of the contract.

use fanpulse_common::config::OverridePolicy;
use fanpulse_common::Artist;
use tracing::warn;

/// Built-in correction rules, in priority order
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("dope", "Dove Cameron"),
    ("nath", "Nathy Peluso"),
    ("calo", "Carlos Rivera"),
    ("belo", "BEÉLE"),
    ("beelo", "BEÉLE"),
    ("pereza", "Fuerza Regida"),
    ("miguel", "Miguel Bueno"),
    ("mdo", "Mon Laferte"),
    ("haim", "Ha*Ash"),
    ("jain", "Juan Luis"),
    ("neton", "Neto Bernal"),
];

/// One key → artist rule
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRule {
    /// Lowercase fragment
    pub key: String,
    pub target: Artist,
}

/// Ordered override rules plus the collision policy
#[derive(Debug, Clone)]
pub struct OverrideTable {
    rules: Vec<OverrideRule>,
    policy: OverridePolicy,
}

impl Default for OverrideTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OverrideTable {
    /// Table with the built-in rules and first-in-order policy
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_RULES.iter().copied())
    }

    /// Table with no rules
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            policy: OverridePolicy::default(),
        }
    }

    /// Build from `(key, artist)` pairs, keeping their order.
    ///
    /// Keys are lower-cased. Blank keys would match every candidate and are
    /// dropped.
    pub fn from_pairs<I, K, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, A)>,
        K: AsRef<str>,
        A: AsRef<str>,
    {
        let mut rules = Vec::new();
        for (key, target) in pairs {
            let key = key.as_ref().trim().to_lowercase();
            if key.is_empty() {
                warn!(artist = target.as_ref(), "Ignoring override rule with blank key");
                continue;
            }
            rules.push(OverrideRule {
                key,
                target: Artist::new(target.as_ref().trim()),
            });
        }
        Self {
            rules,
            policy: OverridePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OverridePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OverridePolicy {
        self.policy
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct target artists in rule order
    pub fn targets(&self) -> impl Iterator<Item = &Artist> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(i, rule)| !self.rules[..*i].iter().any(|r| r.target == rule.target))
            .map(|(_, rule)| &rule.target)
    }

    /// Resolve a candidate string (a mention or an artist name).
    ///
    /// An exact key match wins outright. Otherwise a key occurring anywhere in
    /// the lowercased candidate wins, chosen by the table's policy.
    pub fn resolve(&self, candidate: &str) -> Option<&Artist> {
        let candidate = candidate.to_lowercase();
        if candidate.is_empty() {
            return None;
        }

        if let Some(rule) = self.rules.iter().find(|r| r.key == candidate) {
            return Some(&rule.target);
        }

        let mut hits = self.rules.iter().filter(|r| candidate.contains(r.key.as_str()));
        let rule = match self.policy {
            OverridePolicy::FirstInOrder => hits.next(),
            OverridePolicy::LongestKey => hits.fold(None, |best: Option<&OverrideRule>, r| match best {
                Some(b) if b.key.chars().count() >= r.key.chars().count() => Some(b),
                _ => Some(r),
            }),
        };
        rule.map(|r| &r.target)
    }

    /// Post-hoc correction of an already-decided artist.
    ///
    /// Returns the override target only when it differs from `artist`.
    pub fn correct(&self, artist: &Artist) -> Option<&Artist> {
        self.resolve(artist.name()).filter(|target| *target != artist)
    }
}
