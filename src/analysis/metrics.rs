//! Metric names analyzed from storage node exports.

/// Cumulative write-path durations in causal order.
pub const WATERFALL_METRICS: [&str; 7] = [
    "tikv_raftstore_store_wf_batch_wait_duration_seconds",
    "tikv_raftstore_store_wf_send_to_queue_duration_seconds",
    "tikv_raftstore_store_wf_before_write_duration_seconds",
    "tikv_raftstore_store_wf_write_kvdb_end_duration_seconds",
    "tikv_raftstore_store_wf_write_end_duration_seconds",
    "tikv_raftstore_store_wf_persist_duration_seconds",
    "tikv_raftstore_store_wf_commit_log_duration_seconds",
];

/// Coarse consensus phases, each written as a CDF.
pub const PHASE_METRICS: [&str; 5] = [
    "tikv_raftstore_store_duration_secs",
    "tikv_raftstore_apply_duration_secs",
    "tikv_raftstore_append_log_duration_seconds",
    "tikv_raftstore_commit_log_duration_seconds",
    "tikv_raftstore_apply_wait_time_duration_secs",
];

/// Phase metrics whose medians become auxiliary waterfall columns.
#[must_use]
pub fn is_apply_metric(metric: &str) -> bool {
    metric.contains("apply")
}

/// Column name of a waterfall metric: `..._wf_write_kvdb_end_duration_seconds`
/// becomes `WriteKvdbEnd`.
#[must_use]
pub fn waterfall_display_name(metric: &str) -> String {
    display_name(metric, 4)
}

/// Title of a phase CDF: `tikv_raftstore_apply_duration_secs` becomes
/// `Apply`.
#[must_use]
pub fn cdf_display_name(metric: &str) -> String {
    display_name(metric, 2)
}

/// Capitalised components `[skip..len-2]` joined without separator.
fn display_name(metric: &str, skip: usize) -> String {
    let components: Vec<&str> = metric.split('_').collect();
    let end = components.len().saturating_sub(2);
    components
        .get(skip..end)
        .unwrap_or_default()
        .iter()
        .map(|component| capitalize(component))
        .collect()
}

fn capitalize(component: &str) -> String {
    let mut chars = component.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}
