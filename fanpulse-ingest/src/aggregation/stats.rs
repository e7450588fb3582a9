//! Summary statistics over a finished bucket
//!
//! Empty inputs yield 0.0 instead of failing.

use fanpulse_common::config::MedianRule;

/// Median rule used unless configured otherwise.
///
/// The lower-middle element is used for even-length groups: for
/// `[10, 20, 30, 40]` the median is 20.
pub const DEFAULT_MEDIAN_RULE: MedianRule = MedianRule::LowerMiddle;

/// Arithmetic mean; 0.0 for no values
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of integer counters, summed exactly before dividing
pub fn mean_u64(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: u128 = values.iter().map(|&v| v as u128).sum();
    total as f64 / values.len() as f64
}

/// Median under `rule`; 0.0 for no values
pub fn median(values: &[f64], rule: MedianRule) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    if n % 2 == 1 {
        return sorted[n / 2];
    }

    match rule {
        MedianRule::LowerMiddle => sorted[n / 2 - 1],
        MedianRule::UpperMiddle => sorted[n / 2],
        MedianRule::Interpolated => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Exact integer sum, saturating instead of wrapping
pub fn sum_u64<I: IntoIterator<Item = u64>>(values: I) -> u64 {
    values.into_iter().fold(0u64, u64::saturating_add)
}
