use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::args::ExperimentSpec;
use crate::error::MetricsError;

use super::metrics::{PHASE_METRICS, WATERFALL_METRICS, is_apply_metric, waterfall_display_name};
use super::parse::MetricSample;
use super::stats::{CdfPoint, body_waterfall, cdf_series, median_time};

/// Waterfall table shared by every experiment of one analysis pass.
pub const WATERFALL_FILE: &str = "raftcommit_metrics.dat";

/// One labelled metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    pub label: String,
    pub body: String,
}

impl Experiment {
    /// Reads every snapshot, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns an error when the list is empty or a file cannot be read.
    pub async fn load_all(specs: &[ExperimentSpec]) -> Result<Vec<Self>, MetricsError> {
        if specs.is_empty() {
            return Err(MetricsError::NoExperiments);
        }
        let mut experiments = Vec::with_capacity(specs.len());
        for spec in specs {
            let body = tokio::fs::read_to_string(&spec.metrics_path)
                .await
                .map_err(|err| MetricsError::ReadExport {
                    path: spec.metrics_path.clone(),
                    source: err,
                })?;
            experiments.push(Self {
                label: spec.label.clone(),
                body,
            });
        }
        Ok(experiments)
    }
}

/// Waterfall deltas and apply-phase medians of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallRow {
    pub label: String,
    pub deltas: Vec<f64>,
    pub apply: Vec<f64>,
}

impl WaterfallRow {
    #[must_use]
    pub fn from_experiment(experiment: &Experiment) -> Self {
        let apply = PHASE_METRICS
            .iter()
            .filter(|metric| is_apply_metric(metric))
            .map(|metric| median_time(&MetricSample::parse(&experiment.body, metric)).or_zero())
            .collect();
        Self {
            label: experiment.label.to_uppercase(),
            deltas: body_waterfall(&experiment.body, &WATERFALL_METRICS),
            apply,
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut line = self.label.clone();
        for value in self.deltas.iter().chain(&self.apply) {
            if write!(line, "\t{:.6}", value).is_err() {
                break;
            }
        }
        line
    }
}

#[must_use]
pub fn waterfall_header() -> String {
    let names: Vec<String> = WATERFALL_METRICS
        .iter()
        .map(|metric| waterfall_display_name(metric))
        .collect();
    format!("Experiment\t{}\tApplyTime\tApplyWait", names.join("\t"))
}

/// CDF of one phase metric for one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct CdfData {
    pub label: String,
    pub metric: &'static str,
    pub points: Vec<CdfPoint>,
}

impl CdfData {
    #[must_use]
    pub fn file_name(&self) -> String {
        cdf_file_name(&self.label, self.metric)
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("# time_ms\tcumulative_count\tcumulative_probability\n");
        for point in &self.points {
            if writeln!(
                out,
                "{:.6}\t{}\t{:.6}",
                point.time_ms, point.cumulative_count, point.probability
            )
            .is_err()
            {
                break;
            }
        }
        out
    }
}

/// `{label}-{metric}.dat`
#[must_use]
pub fn cdf_file_name(label: &str, metric: &str) -> String {
    format!("{}-{}.dat", label, metric)
}

/// Everything one analysis pass derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub rows: Vec<WaterfallRow>,
    pub cdfs: Vec<CdfData>,
}

impl Analysis {
    #[must_use]
    pub fn compute(experiments: &[Experiment]) -> Self {
        let rows = experiments.iter().map(WaterfallRow::from_experiment).collect();
        let cdfs = experiments
            .iter()
            .flat_map(|experiment| {
                PHASE_METRICS.iter().map(move |&metric| {
                    let sample = MetricSample::parse(&experiment.body, metric);
                    CdfData {
                        label: experiment.label.clone(),
                        metric,
                        points: cdf_series(&sample.buckets, sample.count.or_zero()),
                    }
                })
            })
            .collect();
        Self { rows, cdfs }
    }

    #[must_use]
    pub fn render_waterfall(&self) -> String {
        let mut out = waterfall_header();
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.render());
            out.push('\n');
        }
        out
    }

    /// Writes the waterfall table and every CDF file into `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or a file cannot be written.
    pub async fn write(&self, out_dir: &Path) -> Result<Vec<PathBuf>, MetricsError> {
        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|err| MetricsError::WriteOutput {
                path: out_dir.to_path_buf(),
                source: err,
            })?;

        let mut written = Vec::with_capacity(self.cdfs.len().saturating_add(1));
        written.push(write_file(&out_dir.join(WATERFALL_FILE), &self.render_waterfall()).await?);
        for cdf in &self.cdfs {
            written.push(write_file(&out_dir.join(cdf.file_name()), &cdf.render()).await?);
        }
        info!("Wrote {} analysis file(s) to {}", written.len(), out_dir.display());
        Ok(written)
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<PathBuf, MetricsError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|err| MetricsError::WriteOutput {
            path: path.to_path_buf(),
            source: err,
        })?;
    Ok(path.to_path_buf())
}
