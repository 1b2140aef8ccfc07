//! Line-oriented parsing of metrics export bodies.
//!
//! A count line reads `<metric>_count[{labels}] <integer>`; a bucket line
//! reads `<metric>_bucket{...le="<bound>"...} <integer>`. Names must match
//! exactly, so `foo_count` never matches a query for `fo`.
use super::reading::Reading;

/// One cumulative histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Upper bound in seconds.
    pub upper_bound: f64,
    pub cumulative_count: u64,
}

/// Count and finite buckets of one metric in one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub name: String,
    pub count: Reading<u64>,
    pub buckets: Vec<Bucket>,
}

impl MetricSample {
    #[must_use]
    pub fn parse(body: &str, metric: &str) -> Self {
        Self {
            name: metric.to_owned(),
            count: count(body, metric),
            buckets: buckets(body, metric),
        }
    }
}

/// Total observation count of `metric`, from its first count line.
#[must_use]
pub fn count(body: &str, metric: &str) -> Reading<u64> {
    let name = format!("{}_count", metric);
    samples(body)
        .find(|line| line_name(line) == name)
        .and_then(last_integer)
        .map_or(Reading::Absent, Reading::Value)
}

/// Finite buckets of `metric` in emission order. The `+Inf` bucket is
/// dropped.
#[must_use]
pub fn buckets(body: &str, metric: &str) -> Vec<Bucket> {
    let name = format!("{}_bucket", metric);
    samples(body)
        .filter(|line| line_name(line) == name)
        .filter_map(|line| {
            let upper_bound: f64 = label_value(line, "le")?.parse().ok()?;
            if !upper_bound.is_finite() {
                return None;
            }
            let cumulative_count = last_integer(line)?;
            Some(Bucket {
                upper_bound,
                cumulative_count,
            })
        })
        .collect()
}

fn samples(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn line_name(line: &str) -> &str {
    let end = line
        .find(|ch: char| ch == '{' || ch.is_whitespace())
        .unwrap_or(line.len());
    line.get(..end).unwrap_or(line)
}

fn last_integer(line: &str) -> Option<u64> {
    line.split_whitespace().next_back()?.parse().ok()
}

/// Raw value of `label` in the `{key="value",...}` set. Values are scanned
/// quote to quote, so commas and escaped quotes inside them are kept.
fn label_value<'line>(line: &'line str, label: &str) -> Option<&'line str> {
    let mut rest = line.get(line.find('{')?.checked_add(1)?..)?;
    loop {
        rest = rest.trim_start_matches([',', ' ']);
        if rest.starts_with('}') {
            return None;
        }
        let (key, quoted) = rest.split_once('=')?;
        let quoted = quoted.strip_prefix('"')?;
        let close = closing_quote(quoted)?;
        if key.trim() == label {
            return quoted.get(..close);
        }
        rest = quoted.get(close.checked_add(1)?..)?;
    }
}

fn closing_quote(value: &str) -> Option<usize> {
    let mut escaped = false;
    value.char_indices().find_map(|(index, ch)| {
        let closes = ch == '"' && !escaped;
        escaped = ch == '\\' && !escaped;
        closes.then_some(index)
    })
}
