//! Monthly aggregate

use super::stats::{mean, mean_u64, median, sum_u64};
use fanpulse_common::config::MedianRule;
use fanpulse_common::time::YearMonth;
use fanpulse_common::AttributedPost;

/// Summary of every dated post published in one calendar month
#[derive(Debug, Clone)]
pub struct MonthlyAggregate<'a> {
    pub month: YearMonth,
    pub total_posts: usize,
    pub median_views: f64,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_interaction_rate: f64,
    pub total_shares: u64,
    pub total_comments: u64,
    pub total_collects: u64,
    /// Contributing posts in input order
    pub posts: Vec<&'a AttributedPost>,
}

impl<'a> MonthlyAggregate<'a> {
    /// Summarize a finished bucket
    pub fn from_posts(month: YearMonth, posts: Vec<&'a AttributedPost>, median_rule: MedianRule) -> Self {
        let views: Vec<u64> = posts.iter().map(|p| p.post.counters.views).collect();
        let likes: Vec<u64> = posts.iter().map(|p| p.post.counters.likes).collect();
        let rates: Vec<f64> = posts.iter().map(|p| p.interaction_rate).collect();
        let views_f: Vec<f64> = views.iter().map(|&v| v as f64).collect();

        Self {
            month,
            total_posts: posts.len(),
            median_views: median(&views_f, median_rule),
            avg_views: mean_u64(&views),
            avg_likes: mean_u64(&likes),
            avg_interaction_rate: mean(&rates),
            total_shares: sum_u64(posts.iter().map(|p| p.post.counters.shares)),
            total_comments: sum_u64(posts.iter().map(|p| p.post.counters.comments)),
            total_collects: sum_u64(posts.iter().map(|p| p.post.counters.collects)),
            posts,
        }
    }
}
