//! Per-platform processing pipeline
//!
//! Maps export rows to posts, attributes every post, computes its
//! interaction rate and tallies a `RunSummary`. Attribution is independent
//! per post, so classification runs on a rayon pool; results keep input
//! order.

use crate::engagement::interaction_rate_for;
use crate::matching::ArtistMatcher;
use crate::records::{MappedRow, Row, RowMapper};
use fanpulse_common::{AttributedPost, MatchMethod, Platform, RawPost};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Counts for one platform run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_rows: usize,
    pub attributed: usize,
    pub unattributed: usize,
    /// Attributions rewritten by the post-hoc override pass
    pub corrected: usize,
    /// Rows with no parseable date (kept, but left out of monthly buckets)
    pub missing_date: usize,
    /// Counter cells replaced by 0
    pub malformed_numeric: usize,
    /// Attributions per committing strategy
    pub by_method: BTreeMap<MatchMethod, usize>,
}

impl RunSummary {
    /// Share of rows attributed, in percent
    pub fn attributed_pct(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        self.attributed as f64 / self.total_rows as f64 * 100.0
    }

    fn record(&mut self, post: &AttributedPost) {
        self.total_rows += 1;
        if post.post.date.is_none() {
            self.missing_date += 1;
        }
        match &post.attribution {
            fanpulse_common::Attribution::Attributed { method, corrected, .. } => {
                self.attributed += 1;
                if *corrected {
                    self.corrected += 1;
                }
                *self.by_method.entry(*method).or_default() += 1;
            }
            fanpulse_common::Attribution::Unattributed => self.unattributed += 1,
        }
    }
}

/// Output of one platform run
#[derive(Debug, Clone)]
pub struct PlatformRun {
    pub platform: Platform,
    /// Attributed posts in input row order
    pub posts: Vec<AttributedPost>,
    pub summary: RunSummary,
}

pub struct Pipeline {
    matcher: ArtistMatcher,
    mappers: BTreeMap<Platform, RowMapper>,
    /// Worker threads for classification; `None` uses the global rayon pool
    jobs: Option<usize>,
}

impl Pipeline {
    /// Pipeline with the built-in column presets
    pub fn new(matcher: ArtistMatcher) -> Self {
        let mappers = Platform::ALL
            .iter()
            .map(|&p| (p, RowMapper::for_platform(p)))
            .collect();
        Self {
            matcher,
            mappers,
            jobs: None,
        }
    }

    pub fn with_mappers(mut self, mappers: BTreeMap<Platform, RowMapper>) -> Self {
        self.mappers.extend(mappers);
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs.filter(|&n| n > 0);
        self
    }

    pub fn matcher(&self) -> &ArtistMatcher {
        &self.matcher
    }

    /// Attribute posts and compute their interaction rates.
    ///
    /// Output order matches input order regardless of thread count.
    pub fn classify(&self, posts: Vec<RawPost>) -> Vec<AttributedPost> {
        match self.jobs {
            Some(1) => posts.into_iter().map(|p| self.classify_one(p)).collect(),
            Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(|| self.classify_parallel(posts)),
                Err(e) => {
                    warn!(jobs = n, error = %e, "Failed to build thread pool, using global pool");
                    self.classify_parallel(posts)
                }
            },
            None => self.classify_parallel(posts),
        }
    }

    fn classify_parallel(&self, posts: Vec<RawPost>) -> Vec<AttributedPost> {
        posts.into_par_iter().map(|p| self.classify_one(p)).collect()
    }

    fn classify_one(&self, post: RawPost) -> AttributedPost {
        let attribution = self.matcher.attribute(Some(&post.description));
        let interaction_rate = interaction_rate_for(&post.counters);
        AttributedPost {
            post,
            attribution,
            interaction_rate,
        }
    }

    /// Map, classify and summarize one platform's rows
    pub fn run_platform(&self, rows: &[Row], platform: Platform) -> PlatformRun {
        let mapper = self
            .mappers
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| RowMapper::for_platform(platform));

        let mapped: Vec<MappedRow> = rows.iter().map(|row| mapper.map_row(row)).collect();
        let malformed_numeric: usize = mapped.iter().map(|m| m.malformed_fields).sum();
        let posts = self.classify(mapped.into_iter().map(|m| m.post).collect());

        let mut summary = RunSummary {
            malformed_numeric,
            ..Default::default()
        };
        for post in &posts {
            summary.record(post);
        }

        info!(
            platform = %platform,
            "classified {}/{} ({:.1}%)",
            summary.attributed,
            summary.total_rows,
            summary.attributed_pct()
        );
        if summary.missing_date > 0 || summary.malformed_numeric > 0 {
            warn!(
                platform = %platform,
                missing_date = summary.missing_date,
                malformed_numeric = summary.malformed_numeric,
                "Recovered from bad records"
            );
        }

        PlatformRun {
            platform,
            posts,
            summary,
        }
    }
}
