//! Per-artist aggregate

use super::stats::{mean, mean_u64, sum_u64};
use fanpulse_common::{Artist, AttributedPost, Platform};
use std::collections::BTreeMap;

/// Summary of one artist's posts on one platform
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistAggregate {
    pub platform: Platform,
    pub total_posts: usize,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_interaction_rate: f64,
    pub total_views: u64,
    pub total_likes: u64,
}

impl ArtistAggregate {
    pub fn from_posts(platform: Platform, posts: &[&AttributedPost]) -> Self {
        let views: Vec<u64> = posts.iter().map(|p| p.post.counters.views).collect();
        let likes: Vec<u64> = posts.iter().map(|p| p.post.counters.likes).collect();
        let rates: Vec<f64> = posts.iter().map(|p| p.interaction_rate).collect();

        Self {
            platform,
            total_posts: posts.len(),
            avg_views: mean_u64(&views),
            avg_likes: mean_u64(&likes),
            avg_interaction_rate: mean(&rates),
            total_views: sum_u64(views.iter().copied()),
            total_likes: sum_u64(likes.iter().copied()),
        }
    }
}

/// Combine per-platform artist maps into `artist → platform → aggregate`
pub fn merge_platform_stats<I>(per_platform: I) -> BTreeMap<Artist, BTreeMap<Platform, ArtistAggregate>>
where
    I: IntoIterator<Item = (Platform, BTreeMap<Artist, ArtistAggregate>)>,
{
    let mut merged: BTreeMap<Artist, BTreeMap<Platform, ArtistAggregate>> = BTreeMap::new();
    for (platform, stats) in per_platform {
        for (artist, aggregate) in stats {
            merged.entry(artist).or_default().insert(platform, aggregate);
        }
    }
    merged
}
