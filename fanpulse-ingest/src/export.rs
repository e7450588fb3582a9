//! Dashboard export
//!
//! Converts aggregates into the JSON documents the dashboard reads. This is
//! the only place values are rounded, descriptions truncated and the
//! unattributed label substituted; everything upstream keeps full precision.

use crate::aggregation::{ArtistAggregate, MonthlyAggregate};
use crate::error::IngestResult;
use fanpulse_common::config::{write_atomic, OutputConfig};
use fanpulse_common::numeric::round2;
use fanpulse_common::text::truncate_chars;
use fanpulse_common::time::YearMonth;
use fanpulse_common::{Artist, AttributedPost, Platform};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cross-platform artist statistics file name
pub const ARTIST_STATS_FILE: &str = "artist_stats.json";

/// Monthly data file name for a platform (`data_tiktok.json`, ...)
pub fn monthly_file_name(platform: Platform) -> String {
    format!("data_{}.json", platform.as_str())
}

/// Output-boundary formatting
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub description_max_chars: usize,
    pub unattributed_label: String,
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for ExportOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            description_max_chars: config.description_max_chars,
            unattributed_label: config.unattributed_label.clone(),
            pretty: config.pretty,
        }
    }
}

/// One post inside a month's `all_videos`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub date: String,
    pub description: String,
    pub artist: String,
    pub url: String,
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub collects: u64,
    pub ir: f64,
}

/// One month of `data_<platform>.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub year_month: String,
    pub total_posts: usize,
    pub median_views: f64,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_ir: f64,
    pub total_shares: u64,
    pub total_comments: u64,
    pub total_collects: u64,
    pub all_videos: Vec<PostRecord>,
}

/// One artist's numbers on one platform in `artist_stats.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistPlatformReport {
    pub total_videos: usize,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_ir: f64,
    pub total_views: u64,
    pub total_likes: u64,
}

/// `data_<platform>.json` document, keyed by `YYYY-MM`
pub type MonthlyDocument = BTreeMap<String, MonthlyReport>;

/// `artist_stats.json` document: artist name → platform → stats
pub type ArtistDocument = BTreeMap<String, BTreeMap<String, ArtistPlatformReport>>;

impl ExportOptions {
    pub fn post_record(&self, post: &AttributedPost) -> PostRecord {
        let counters = &post.post.counters;
        PostRecord {
            date: post
                .post
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            description: truncate_chars(&post.post.description, self.description_max_chars).to_string(),
            artist: post
                .artist()
                .map(|a| a.name().to_string())
                .unwrap_or_else(|| self.unattributed_label.clone()),
            url: post.post.permalink.clone(),
            views: counters.views,
            likes: counters.likes,
            shares: counters.shares,
            comments: counters.comments,
            collects: counters.collects,
            ir: round2(post.interaction_rate),
        }
    }

    pub fn monthly_report(&self, aggregate: &MonthlyAggregate<'_>) -> MonthlyReport {
        MonthlyReport {
            year_month: aggregate.month.to_string(),
            total_posts: aggregate.total_posts,
            median_views: round2(aggregate.median_views),
            avg_views: round2(aggregate.avg_views),
            avg_likes: round2(aggregate.avg_likes),
            avg_ir: round2(aggregate.avg_interaction_rate),
            total_shares: aggregate.total_shares,
            total_comments: aggregate.total_comments,
            total_collects: aggregate.total_collects,
            all_videos: aggregate.posts.iter().map(|p| self.post_record(p)).collect(),
        }
    }

    pub fn monthly_document(&self, months: &BTreeMap<YearMonth, MonthlyAggregate<'_>>) -> MonthlyDocument {
        months
            .iter()
            .map(|(month, aggregate)| (month.to_string(), self.monthly_report(aggregate)))
            .collect()
    }

    pub fn artist_report(&self, aggregate: &ArtistAggregate) -> ArtistPlatformReport {
        ArtistPlatformReport {
            total_videos: aggregate.total_posts,
            avg_views: round2(aggregate.avg_views),
            avg_likes: round2(aggregate.avg_likes),
            avg_ir: round2(aggregate.avg_interaction_rate),
            total_views: aggregate.total_views,
            total_likes: aggregate.total_likes,
        }
    }

    pub fn artist_document(&self, merged: &BTreeMap<Artist, BTreeMap<Platform, ArtistAggregate>>) -> ArtistDocument {
        merged
            .iter()
            .map(|(artist, platforms)| {
                let per_platform = platforms
                    .iter()
                    .map(|(platform, aggregate)| (platform.as_str().to_string(), self.artist_report(aggregate)))
                    .collect();
                (artist.name().to_string(), per_platform)
            })
            .collect()
    }

    /// Serialize `document` into `dir/file_name`, replacing any previous file
    pub fn write_json<T: Serialize>(&self, dir: &Path, file_name: &str, document: &T) -> IngestResult<PathBuf> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)?
        } else {
            serde_json::to_vec(document)?
        };
        let path = dir.join(file_name);
        write_atomic(&path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote export file");
        Ok(path)
    }
}
