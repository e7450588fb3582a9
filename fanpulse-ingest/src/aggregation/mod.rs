//! Metric aggregation
//!
//! Folds attributed posts into monthly buckets and per-artist buckets. Each
//! pass first places every post in its bucket and only then summarizes, so no
//! bucket is read while still filling.

pub mod artist;
pub mod monthly;
pub mod stats;

pub use artist::{merge_platform_stats, ArtistAggregate};
pub use monthly::MonthlyAggregate;
pub use stats::DEFAULT_MEDIAN_RULE;

use fanpulse_common::config::MedianRule;
use fanpulse_common::time::YearMonth;
use fanpulse_common::{Artist, AttributedPost, Platform};
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregation settings
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    median_rule: MedianRule,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIAN_RULE)
    }
}

impl Aggregator {
    pub fn new(median_rule: MedianRule) -> Self {
        Self { median_rule }
    }

    pub fn median_rule(&self) -> MedianRule {
        self.median_rule
    }

    /// Group dated posts by calendar month.
    ///
    /// Undated posts cannot be bucketed and are skipped.
    pub fn by_month<'a>(&self, posts: &'a [AttributedPost]) -> BTreeMap<YearMonth, MonthlyAggregate<'a>> {
        let mut buckets: BTreeMap<YearMonth, Vec<&'a AttributedPost>> = BTreeMap::new();
        let mut undated = 0usize;

        for post in posts {
            match post.post.date {
                Some(date) => buckets.entry(YearMonth::from_date(date)).or_default().push(post),
                None => undated += 1,
            }
        }

        if undated > 0 {
            debug!(undated, "Skipped undated posts in monthly aggregation");
        }

        buckets
            .into_iter()
            .map(|(month, group)| {
                let aggregate = MonthlyAggregate::from_posts(month, group, self.median_rule);
                (month, aggregate)
            })
            .collect()
    }

    /// Group attributed posts by artist for one platform.
    ///
    /// Unattributed posts are skipped; undated posts are included.
    pub fn by_artist(&self, posts: &[AttributedPost], platform: Platform) -> BTreeMap<Artist, ArtistAggregate> {
        let mut buckets: BTreeMap<Artist, Vec<&AttributedPost>> = BTreeMap::new();

        for post in posts {
            if let Some(artist) = post.artist() {
                buckets.entry(artist.clone()).or_default().push(post);
            }
        }

        buckets
            .into_iter()
            .map(|(artist, group)| {
                let aggregate = ArtistAggregate::from_posts(platform, &group);
                (artist, aggregate)
            })
            .collect()
    }
}

/// Monthly aggregation with the default median rule
pub fn aggregate_by_month(posts: &[AttributedPost]) -> BTreeMap<YearMonth, MonthlyAggregate<'_>> {
    Aggregator::default().by_month(posts)
}

/// Per-artist aggregation for one platform
pub fn aggregate_by_artist(posts: &[AttributedPost], platform: Platform) -> BTreeMap<Artist, ArtistAggregate> {
    Aggregator::default().by_artist(posts, platform)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use fanpulse_common::{Artist, Attribution, AttributedPost, Counters, MatchMethod, RawPost};

    use crate::engagement::interaction_rate_for;

    pub fn post(date: Option<(i32, u32, u32)>, artist: Option<&str>, views: u64, likes: u64) -> AttributedPost {
        let counters = Counters {
            views,
            likes,
            comments: 1,
            shares: 2,
            collects: 3,
        };
        let attribution = match artist {
            Some(name) => Attribution::Attributed {
                artist: Artist::new(name),
                confidence: 1.0,
                method: MatchMethod::WholeWord,
                corrected: false,
            },
            None => Attribution::Unattributed,
        };
        AttributedPost {
            post: RawPost {
                date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                description: String::new(),
                counters,
                permalink: String::new(),
            },
            attribution,
            interaction_rate: interaction_rate_for(&counters),
        }
    }
}
