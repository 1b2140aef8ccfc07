//! Gnuplot scripts for the analysis data files, and the runner that pipes
//! them into `gnuplot`.
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

use crate::analysis::metrics::{PHASE_METRICS, cdf_display_name};
use crate::analysis::{WATERFALL_FILE, cdf_file_name};
use crate::error::{MetricsError, PlotError};

const STORE_METRIC: &str = "tikv_raftstore_store_duration_secs";
const APPLY_METRIC: &str = "tikv_raftstore_apply_duration_secs";
const MULTIPLOT_NAME: &str = "request_coarse_phase_cdf";

/// A script and the stem shared by its `.gp` file and its PDF output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnuplotScript {
    pub stem: String,
    pub body: String,
}

impl GnuplotScript {
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.gp", self.stem)
    }
}

/// One script per phase metric CDF, then the combined multiplot.
#[must_use]
pub fn analysis_scripts(labels: &[String]) -> Vec<GnuplotScript> {
    PHASE_METRICS
        .iter()
        .map(|metric| cdf_script(metric, labels))
        .chain(std::iter::once(multiplot_script(labels)))
        .collect()
}

/// Step plot of `metric`'s CDF, one line per experiment.
#[must_use]
pub fn cdf_script(metric: &str, labels: &[String]) -> GnuplotScript {
    let display = cdf_display_name(metric);
    let stem = format!("{}_cdf", display);
    let body = format!(
        "set terminal pdf size 5in,3in
set output \"{stem}.pdf\"
set title \"{display} CDF\"
unset xlabel
set ylabel \"Cumulative Probability\"
set yrange [0:1]
set xrange [0:*]
set key bottom right

plot {lines}
",
        lines = cdf_lines(metric, labels, false)
    );
    GnuplotScript { stem, body }
}

/// Propose+commit and apply CDFs on the left, stacked consensus phases of
/// the median operation on the right.
#[must_use]
pub fn multiplot_script(labels: &[String]) -> GnuplotScript {
    let styles: String = (1..=labels.len())
        .map(|index| format!("set style line {} lc rgb \"black\" dt {} lw 2\n", index, index))
        .collect();
    let body = format!(
        "set terminal pdf size 4.5in,3in
set output \"{stem}.pdf\"
set ylabel \"Cumulative Probability\"
set yrange [0:1]
set xrange [0:*]
set tics nomirror

{styles}
left_width = 0.46
left_height = 0.49
left_x = 0.02
gap = 0.02

right_width = 0.45
right_height = 1.0
right_x = 0.52

set multiplot
set title \"Propose + Commit\"
set key off
set size left_width, left_height
set origin left_x, 0.5 + gap/2
plot {store}

set title \"Apply\"
set key bottom right
set xlabel \"Time (msec)\"
set size left_width, left_height
set origin left_x, 0.02
plot {apply}

set size right_width, right_height
set origin right_x, 0.02

set title \"Consensus Phases - Median Op\"
unset xlabel
set ylabel \"Commit Time (msec)\"
set yrange [0:*]
set xrange [-0.5:{xmax}.5]
set key autotitle columnheader
set key below
set style data histograms
set style histogram rowstacked
set boxwidth 0.5
set style fill pattern border -1

plot '{table}' using ($2+$3):xtic(1) title 'Propose' ls 9, \\
     '' using ($4+$5+$6) title 'Commit-disk' ls 4, \\
     '' using 8 title 'Commit-followers' ls 8, \\
     '' using 9 title 'Apply' ls 10
unset multiplot
",
        stem = MULTIPLOT_NAME,
        store = cdf_lines(STORE_METRIC, labels, true),
        apply = cdf_lines(APPLY_METRIC, labels, true),
        xmax = labels.len().saturating_sub(1),
        table = WATERFALL_FILE,
    );
    GnuplotScript {
        stem: MULTIPLOT_NAME.to_owned(),
        body,
    }
}

fn cdf_lines(metric: &str, labels: &[String], styled: bool) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let style = if styled {
                format!(" ls {}", index.saturating_add(1))
            } else {
                String::new()
            };
            format!(
                "\"{}\" using 1:3 with steps{} title \"{}\"",
                cdf_file_name(label, metric),
                style,
                label.to_uppercase()
            )
        })
        .collect::<Vec<_>>()
        .join(", \\\n     ")
}

/// Writes every script next to the data files.
///
/// # Errors
///
/// Returns an error when a script file cannot be written.
pub async fn write_scripts(
    out_dir: &Path,
    scripts: &[GnuplotScript],
) -> Result<Vec<PathBuf>, MetricsError> {
    let mut written = Vec::with_capacity(scripts.len());
    for script in scripts {
        let path = out_dir.join(script.file_name());
        tokio::fs::write(&path, &script.body)
            .await
            .map_err(|err| MetricsError::WriteOutput {
                path: path.clone(),
                source: err,
            })?;
        written.push(path);
    }
    Ok(written)
}

/// Pipes `script` into `gnuplot` running in `working_dir`.
///
/// # Errors
///
/// Returns an error when gnuplot is not installed, cannot be driven, or
/// exits unsuccessfully.
pub async fn run_gnuplot(script: &str, working_dir: &Path) -> Result<(), PlotError> {
    let mut child = Command::new("gnuplot")
        .current_dir(working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PlotError::GnuplotMissing
            } else {
                PlotError::GnuplotIo { source: err }
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.as_bytes())
            .await
            .map_err(|err| PlotError::GnuplotIo { source: err })?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|err| PlotError::GnuplotIo { source: err })?;
    if output.status.success() {
        return Ok(());
    }
    Err(PlotError::GnuplotFailed {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

/// Runs every script, logging failures. Data files are left untouched
/// either way. Returns the number of scripts that rendered.
pub async fn render_scripts(working_dir: &Path, scripts: &[GnuplotScript]) -> usize {
    let mut rendered = 0_usize;
    for script in scripts {
        match run_gnuplot(&script.body, working_dir).await {
            Ok(()) => {
                info!("Rendered {}.pdf", script.stem);
                rendered = rendered.saturating_add(1);
            }
            Err(PlotError::GnuplotMissing) => {
                warn!("{}", PlotError::GnuplotMissing);
                break;
            }
            Err(err) => warn!("Error running gnuplot for {}: {}", script.stem, err),
        }
    }
    rendered
}
