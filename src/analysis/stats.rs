use tracing::warn;

use super::parse::{Bucket, MetricSample};
use super::reading::Reading;

const MILLIS_PER_SECOND: f64 = 1000.0;

/// Median latency in milliseconds: the upper bound of the first bucket whose
/// cumulative count reaches `count / 2`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "seconds to milliseconds")]
pub fn median_time(sample: &MetricSample) -> Reading<f64> {
    let Reading::Value(count) = sample.count else {
        warn!("{}: no count line, median unavailable", sample.name);
        return Reading::Absent;
    };
    let target = count / 2;
    match sample
        .buckets
        .iter()
        .find(|bucket| bucket.cumulative_count >= target)
    {
        Some(bucket) => Reading::Value(bucket.upper_bound * MILLIS_PER_SECOND),
        None => {
            warn!(
                "{}: median value not found (no bucket reaches {} of {})",
                sample.name, target, count
            );
            Reading::Insufficient { target }
        }
    }
}

/// Phase durations from medians of cumulative-duration metrics in causal
/// order: each entry is the difference from the previous median, the first
/// from zero. Negative deltas are kept.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "differences of medians")]
pub fn waterfall_deltas(medians: &[Reading<f64>]) -> Vec<f64> {
    let mut previous = 0.0;
    medians
        .iter()
        .map(|median| {
            let current = median.or_zero();
            let delta = current - previous;
            previous = current;
            delta
        })
        .collect()
}

/// Medians of `metrics` in `body`, reduced to waterfall deltas.
#[must_use]
pub fn body_waterfall(body: &str, metrics: &[&str]) -> Vec<f64> {
    let medians: Vec<Reading<f64>> = metrics
        .iter()
        .map(|metric| median_time(&MetricSample::parse(body, metric)))
        .collect();
    waterfall_deltas(&medians)
}

/// One row of a cumulative distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdfPoint {
    pub time_ms: f64,
    pub cumulative_count: u64,
    pub probability: f64,
}

/// Cumulative probability per bucket. Empty when `count` is zero;
/// probabilities never exceed one.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "probabilities and unit scaling")]
pub fn cdf_series(buckets: &[Bucket], count: u64) -> Vec<CdfPoint> {
    if count == 0 {
        return Vec::new();
    }
    let total = count as f64;
    buckets
        .iter()
        .map(|bucket| CdfPoint {
            time_ms: bucket.upper_bound * MILLIS_PER_SECOND,
            cumulative_count: bucket.cumulative_count,
            probability: (bucket.cumulative_count as f64 / total).min(1.0),
        })
        .collect()
}
