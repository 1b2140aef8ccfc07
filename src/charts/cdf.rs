use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::analysis::CdfData;
use crate::analysis::metrics::cdf_display_name;
use crate::error::PlotError;

type DrawError = DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>;

const PALETTE: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

/// Runs [`plot_cdf_charts`] on the blocking pool.
///
/// # Errors
///
/// Returns an error when a chart cannot be drawn or the render task dies.
pub async fn render_cdf_charts(
    cdfs: Vec<CdfData>,
    out_dir: PathBuf,
) -> Result<Vec<PathBuf>, PlotError> {
    let task_dir = out_dir.clone();
    tokio::task::spawn_blocking(move || plot_cdf_charts(&cdfs, &task_dir))
        .await
        .map_err(|err| PlotError::Render {
            path: out_dir,
            message: err.to_string(),
        })?
}

/// Renders one PNG per metric with a step line per experiment.
///
/// # Errors
///
/// Returns an error when a chart cannot be drawn or written.
pub fn plot_cdf_charts(cdfs: &[CdfData], out_dir: &Path) -> Result<Vec<PathBuf>, PlotError> {
    let mut metrics: Vec<&'static str> = Vec::new();
    for cdf in cdfs {
        if !metrics.contains(&cdf.metric) {
            metrics.push(cdf.metric);
        }
    }

    let mut written = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let series: Vec<&CdfData> = cdfs.iter().filter(|cdf| cdf.metric == metric).collect();
        let path = out_dir.join(format!("{}_cdf.png", cdf_display_name(metric)));
        plot_cdf(metric, &series, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// # Errors
///
/// Returns an error when the chart cannot be drawn or written.
pub fn plot_cdf(metric: &str, series: &[&CdfData], path: &Path) -> Result<(), PlotError> {
    draw_cdf(metric, series, path).map_err(|err| PlotError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn draw_cdf(metric: &str, series: &[&CdfData], path: &Path) -> Result<(), DrawError> {
    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = series
        .iter()
        .flat_map(|cdf| cdf.points.iter().map(|point| point.time_ms))
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} CDF", cdf_display_name(metric)),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0_f64..x_max, 0.0_f64..1.0_f64)?;

    chart
        .configure_mesh()
        .x_desc("Time (msec)")
        .y_desc("Cumulative Probability")
        .draw()?;

    for (cdf, color) in series.iter().zip(PALETTE.iter().cycle()) {
        let color = *color;
        chart
            .draw_series(LineSeries::new(step_points(cdf), &color))?
            .label(cdf.label.to_uppercase())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x.saturating_add(20), y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Corner points of a right-continuous step function starting at zero.
fn step_points(cdf: &CdfData) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(cdf.points.len().saturating_mul(2).saturating_add(1));
    let mut level = 0.0_f64;
    points.push((0.0, level));
    for point in &cdf.points {
        points.push((point.time_ms, level));
        level = point.probability;
        points.push((point.time_ms, level));
    }
    points
}
