use tempfile::tempdir;

use super::metrics::{PHASE_METRICS, WATERFALL_METRICS, cdf_display_name, waterfall_display_name};
use super::*;

const APPLY: &str = "tikv_raftstore_apply_duration_secs";

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn close(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

fn all_close(left: &[f64], right: &[f64]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| close(*l, *r))
}

fn histogram(metric: &str, buckets: &[(&str, u64)], count: u64) -> String {
    let mut body = format!("# HELP {} test\n# TYPE {} histogram\n", metric, metric);
    for (bound, cumulative) in buckets {
        body.push_str(&[metric, "_bucket{le=\"", bound, "\"} ", &cumulative.to_string(), "\n"].concat());
    }
    body.push_str(&[metric, "_bucket{le=\"+Inf\"} ", &count.to_string(), "\n"].concat());
    body.push_str(&[metric, "_sum 1.5\n"].concat());
    body.push_str(&[metric, "_count ", &count.to_string(), "\n"].concat());
    body
}

#[test]
fn median_is_first_bucket_reaching_half_the_count() -> Result<(), String> {
    let body = histogram(APPLY, &[("0.001", 5), ("0.002", 12), ("0.004", 20)], 20);
    let median = median_time(&MetricSample::parse(&body, APPLY));
    match median {
        Reading::Value(ms) if close(ms, 2.0) => Ok(()),
        other => Err(format!("Expected 2.0 ms, got {:?}", other)),
    }
}

#[test]
fn median_without_enough_mass_is_insufficient() -> Result<(), String> {
    let body = histogram(APPLY, &[("0.001", 3)], 20);
    let median = median_time(&MetricSample::parse(&body, APPLY));
    if median != (Reading::Insufficient { target: 10 }) {
        return Err(format!("Expected insufficient reading, got {:?}", median));
    }
    if !close(median.or_zero(), 0.0) {
        return Err("Insufficient reading must count as zero".to_owned());
    }
    Ok(())
}

#[test]
fn missing_count_line_is_absent() {
    let body = "tikv_raftstore_apply_duration_secs_bucket{le=\"0.001\"} 4\n";
    let sample = MetricSample::parse(body, APPLY);
    assert_eq!(sample.count, Reading::Absent);
    assert_eq!(median_time(&sample), Reading::Absent);
}

#[test]
fn metric_names_match_exactly() {
    let body = [
        "tikv_raftstore_apply_duration_secs_total_count 99",
        "tikv_raftstore_apply_duration_secs_count{type=\"raft\"} 7",
        "tikv_raftstore_apply_duration_secs_bucket{type=\"raft\",le=\"0.5\"} 3",
        "tikv_raftstore_apply_duration_secs_totals_bucket{le=\"0.25\"} 1",
    ]
    .join("\n");
    assert_eq!(count(&body, APPLY), Reading::Value(7));
    assert_eq!(
        buckets(&body, APPLY),
        vec![Bucket {
            upper_bound: 0.5,
            cumulative_count: 3
        }]
    );
}

#[test]
fn infinite_bucket_is_excluded_and_order_kept() {
    let body = histogram(APPLY, &[("0.004", 2), ("0.001", 1)], 4);
    let bounds: Vec<u64> = buckets(&body, APPLY)
        .iter()
        .map(|bucket| bucket.cumulative_count)
        .collect();
    assert_eq!(bounds, vec![2, 1]);
}

#[test]
fn bucket_labels_mentioning_inf_are_kept() -> Result<(), String> {
    let body = [
        "tikv_raftstore_apply_duration_secs_bucket{type=\"Info\",le=\"0.002\"} 7",
        "tikv_raftstore_apply_duration_secs_bucket{type=\"Info\",le=\"+Inf\"} 9",
    ]
    .join("\n");
    let parsed = buckets(&body, APPLY);
    match parsed.as_slice() {
        [bucket] if close(bucket.upper_bound, 0.002) && bucket.cumulative_count == 7 => Ok(()),
        other => Err(format!("Expected only the finite bucket, got {:?}", other)),
    }
}

#[test]
fn bound_is_found_after_quoted_commas() -> Result<(), String> {
    let body = [
        "tikv_raftstore_apply_duration_secs_bucket{desc=\"a,le=9\",note=\"say \\\"hi\\\"\",le=\"0.004\"} 3",
        "tikv_raftstore_apply_duration_secs_count 3",
    ]
    .join("\n");
    let parsed = buckets(&body, APPLY);
    match parsed.as_slice() {
        [bucket] if close(bucket.upper_bound, 0.004) => Ok(()),
        other => Err(format!("Expected le=0.004, got {:?}", other)),
    }
}

#[test]
fn waterfall_deltas_follow_medians() {
    let medians = [1.0, 1.5, 1.5, 3.0].map(Reading::Value);
    assert!(all_close(&waterfall_deltas(&medians), &[1.0, 0.5, 0.0, 1.5]));
}

#[test]
fn waterfall_deltas_keep_negative_values_and_zero_missing_phases() {
    let medians = [Reading::Value(2.0), Reading::Value(1.0), Reading::Absent];
    assert!(all_close(&waterfall_deltas(&medians), &[2.0, -1.0, -1.0]));
}

#[test]
fn cdf_is_monotonic_and_ends_at_one_with_full_count() -> Result<(), String> {
    let series = cdf_series(
        &[
            Bucket {
                upper_bound: 0.001,
                cumulative_count: 5,
            },
            Bucket {
                upper_bound: 0.002,
                cumulative_count: 12,
            },
            Bucket {
                upper_bound: 0.004,
                cumulative_count: 20,
            },
        ],
        20,
    );
    let probabilities: Vec<f64> = series.iter().map(|point| point.probability).collect();
    if !probabilities.windows(2).all(|pair| pair.first() <= pair.get(1)) {
        return Err(format!("Not monotonic: {:?}", probabilities));
    }
    if !all_close(&probabilities, &[0.25, 0.6, 1.0]) {
        return Err(format!("Unexpected probabilities: {:?}", probabilities));
    }
    let times: Vec<f64> = series.iter().map(|point| point.time_ms).collect();
    if !all_close(&times, &[1.0, 2.0, 4.0]) {
        return Err(format!("Unexpected times: {:?}", times));
    }
    Ok(())
}

#[test]
fn cdf_of_empty_histogram_is_empty_and_probabilities_are_capped() {
    let bucket = Bucket {
        upper_bound: 0.001,
        cumulative_count: 30,
    };
    assert!(cdf_series(&[bucket], 0).is_empty());
    let capped = cdf_series(&[bucket], 20);
    assert!(capped.iter().all(|point| point.probability <= 1.0));
}

#[test]
fn display_names_drop_prefix_and_unit() {
    let names: Vec<String> = WATERFALL_METRICS
        .iter()
        .map(|metric| waterfall_display_name(metric))
        .collect();
    assert_eq!(
        names,
        [
            "BatchWait",
            "SendToQueue",
            "BeforeWrite",
            "WriteKvdbEnd",
            "WriteEnd",
            "Persist",
            "CommitLog"
        ]
    );
    assert_eq!(cdf_display_name(APPLY), "Apply");
    assert_eq!(cdf_display_name("tikv_raftstore_store_duration_secs"), "Store");
    assert_eq!(
        cdf_display_name("tikv_raftstore_apply_wait_time_duration_secs"),
        "ApplyWaitTime"
    );
}

#[test]
fn waterfall_header_lists_phases_then_apply_columns() {
    assert_eq!(
        waterfall_header(),
        "Experiment\tBatchWait\tSendToQueue\tBeforeWrite\tWriteKvdbEnd\tWriteEnd\tPersist\tCommitLog\tApplyTime\tApplyWait"
    );
}

#[test]
fn waterfall_row_upper_cases_label_and_zeroes_missing_metrics() {
    let experiment = Experiment {
        label: "tikv".to_owned(),
        body: histogram(APPLY, &[("0.001", 5), ("0.002", 12)], 20),
    };
    let row = WaterfallRow::from_experiment(&experiment);
    assert_eq!(row.label, "TIKV");
    assert_eq!(row.deltas.len(), WATERFALL_METRICS.len());
    assert!(row.deltas.iter().all(|delta| close(*delta, 0.0)));
    assert!(all_close(&row.apply, &[2.0, 0.0]));
    assert_eq!(
        row.render(),
        "TIKV\t0.000000\t0.000000\t0.000000\t0.000000\t0.000000\t0.000000\t0.000000\t2.000000\t0.000000"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn analysis_writes_waterfall_and_cdf_files() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let experiments = vec![
        Experiment {
            label: "tikv".to_owned(),
            body: histogram(APPLY, &[("0.001", 5), ("0.002", 12), ("0.004", 20)], 20),
        },
        Experiment {
            label: "xll".to_owned(),
            body: String::new(),
        },
    ];

    let analysis = Analysis::compute(&experiments);
    let written = analysis
        .write(dir.path())
        .await
        .map_err(|err| format!("write failed: {}", err))?;

    let expected_files = PHASE_METRICS.len().saturating_mul(2).saturating_add(1);
    if written.len() != expected_files {
        return Err(format!("Expected {} files, got {}", expected_files, written.len()));
    }
    let table = std::fs::read_to_string(dir.path().join(WATERFALL_FILE))
        .map_err(|err| format!("read failed: {}", err))?;
    if table.lines().count() != 3 || !table.contains("\nXLL\t") {
        return Err(format!("Unexpected waterfall table:\n{}", table));
    }
    let cdf = std::fs::read_to_string(dir.path().join(cdf_file_name("tikv", APPLY)))
        .map_err(|err| format!("read failed: {}", err))?;
    if !cdf.starts_with('#') || !cdf.contains("2.000000\t12\t0.600000") {
        return Err(format!("Unexpected CDF file:\n{}", cdf));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn loading_no_experiments_is_an_error() {
    let result = Experiment::load_all(&[]).await;
    assert!(matches!(result, Err(crate::error::MetricsError::NoExperiments)));
}
