//! Histogram analysis of storage node metrics exports: medians, CDFs and
//! waterfall phase breakdowns.
pub mod metrics;
mod parse;
mod reading;
mod report;
mod stats;

#[cfg(test)]
mod tests;

pub use parse::{Bucket, MetricSample, buckets, count};
pub use reading::Reading;
pub use report::{
    Analysis, CdfData, Experiment, WATERFALL_FILE, WaterfallRow, cdf_file_name, waterfall_header,
};
pub use stats::{CdfPoint, body_waterfall, cdf_series, median_time, waterfall_deltas};
