//! Post and attribution data model
//!
//! A `RawPost` is what the row mapper extracts from a platform export. The
//! matcher and engagement calculator turn it into an `AttributedPost` exactly
//! once; nothing mutates either afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::text::normalize;
use crate::Error;

/// Source platform of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    Instagram,
}

impl Platform {
    /// All supported platforms, in report order
    pub const ALL: [Platform; 2] = [Platform::TikTok, Platform::Instagram];

    /// Lowercase identifier used in file names and JSON keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" => Ok(Platform::TikTok),
            "instagram" | "ig" => Ok(Platform::Instagram),
            other => Err(Error::InvalidInput(format!("Unknown platform: {}", other))),
        }
    }
}

/// A roster artist.
///
/// Carries the display name as written in the roster plus its normalized
/// comparison key. Equality, hashing and ordering use the key only, so
/// `"Ha*Ash"` and `"ha ash"` are the same artist.
#[derive(Debug, Clone)]
pub struct Artist {
    name: String,
    key: String,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = normalize(&name);
        Self { name, key }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized comparison key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Artist {}

impl Hash for Artist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Artist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Artist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Artist {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Strategy that produced an attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Curated override keyed on a mention fragment
    Override,
    /// Mention equals the artist name
    ExactMention,
    /// Normalized mention contains the artist or vice versa
    MentionContainment,
    /// Full artist name appears as whole words in the caption
    WholeWord,
    /// Most words of a multi-word name appear in the caption
    PartialCoverage,
    /// Edit-distance similarity between a mention and the artist
    FuzzyMention,
    /// Normalized artist name found inside the normalized caption
    NormalizedSubstring,
    /// Nothing matched
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Override => "override",
            MatchMethod::ExactMention => "exact_mention",
            MatchMethod::MentionContainment => "mention_containment",
            MatchMethod::WholeWord => "whole_word",
            MatchMethod::PartialCoverage => "partial_coverage",
            MatchMethod::FuzzyMention => "fuzzy_mention",
            MatchMethod::NormalizedSubstring => "normalized_substring",
            MatchMethod::None => "none",
        }
    }
}

/// Outcome of artist matching for one caption
#[derive(Debug, Clone, PartialEq)]
pub enum Attribution {
    Attributed {
        artist: Artist,
        /// 1.0 for rule-based matches, the similarity ratio for fuzzy ones
        confidence: f64,
        method: MatchMethod,
        /// Set when the post-hoc override pass rewrote the matcher's artist
        corrected: bool,
    },
    Unattributed,
}

impl Attribution {
    pub fn artist(&self) -> Option<&Artist> {
        match self {
            Attribution::Attributed { artist, .. } => Some(artist),
            Attribution::Unattributed => None,
        }
    }

    /// Confidence in [0, 1]; always 0 when unattributed
    pub fn confidence(&self) -> f64 {
        match self {
            Attribution::Attributed { confidence, .. } => *confidence,
            Attribution::Unattributed => 0.0,
        }
    }

    pub fn method(&self) -> MatchMethod {
        match self {
            Attribution::Attributed { method, .. } => *method,
            Attribution::Unattributed => MatchMethod::None,
        }
    }

    pub fn is_attributed(&self) -> bool {
        matches!(self, Attribution::Attributed { .. })
    }
}

/// Raw engagement counters; absent counters are 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub collects: u64,
}

/// One post as ingested from an export
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    /// Publish date; `None` when the export had no parseable date
    pub date: Option<NaiveDate>,
    /// Full caption text, never truncated before matching
    pub description: String,
    pub counters: Counters,
    pub permalink: String,
}

/// A post with its attribution and interaction rate
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedPost {
    pub post: RawPost,
    pub attribution: Attribution,
    /// Unrounded interaction rate, always finite and >= 0
    pub interaction_rate: f64,
}

impl AttributedPost {
    pub fn artist(&self) -> Option<&Artist> {
        self.attribution.artist()
    }

    pub fn confidence(&self) -> f64 {
        self.attribution.confidence()
    }
}
