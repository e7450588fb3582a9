//! Interaction rate
//!
//! `(likes + shares + comments + collects) / views * 100`, kept unrounded
//! internally. Not clamped: save- and share-heavy posts can exceed 100.

use fanpulse_common::Counters;

/// Interaction rate for raw counters; 0.0 when there are no views
pub fn interaction_rate(views: u64, likes: u64, shares: u64, comments: u64, collects: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    let engagements = likes as u128 + shares as u128 + comments as u128 + collects as u128;
    engagements as f64 / views as f64 * 100.0
}

/// Interaction rate for a post's counters
pub fn interaction_rate_for(counters: &Counters) -> f64 {
    interaction_rate(
        counters.views,
        counters.likes,
        counters.shares,
        counters.comments,
        counters.collects,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_views_is_zero() {
        assert_eq!(interaction_rate(0, 100, 5, 3, 2), 0.0);
        assert_eq!(interaction_rate(0, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_basic_rate() {
        // (50 + 10 + 30 + 10) / 1000 * 100
        assert!((interaction_rate(1000, 50, 10, 30, 10) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_can_exceed_100() {
        let rate = interaction_rate(10, 8, 4, 2, 6);
        assert!((rate - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_counters_do_not_overflow() {
        let rate = interaction_rate(u64::MAX, u64::MAX, u64::MAX, 0, 0);
        assert!(rate.is_finite());
        assert!((rate - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_counters_helper() {
        let counters = Counters {
            views: 200,
            likes: 10,
            comments: 5,
            shares: 3,
            collects: 2,
        };
        assert!((interaction_rate_for(&counters) - 10.0).abs() < 1e-9);
    }
}
