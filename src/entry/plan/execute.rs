use tracing::{info, warn};

use crate::analysis::{Analysis, Experiment};
use crate::charts::{analysis_scripts, render_cdf_charts, render_scripts, write_scripts};
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::experiment::{
    Cluster, ExperimentParameters, HttpScraper, Immediate, MetricsScraper, Readiness,
    RecordingScraper, SweepController, SweepReport, from_settings,
};

use super::types::{AnalyzePlan, RunPlan, SweepPlan};

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::Sweep(sweep) => run_sweep(*sweep).await,
        RunPlan::Analyze(analyze) => run_analyze(analyze).await,
    }
}

async fn run_sweep(plan: SweepPlan) -> AppResult<()> {
    let SweepPlan {
        params,
        settings,
        dry_run,
    } = plan;

    let (cluster, readiness, scraper) = if dry_run {
        info!("Dry run: remote commands are logged, not executed");
        dry_run_parts(&params)
    } else {
        live_parts(&params, &settings)?
    };

    let mut controller = SweepController::new(params, settings, cluster, readiness, scraper);
    let report = controller.run().await.map_err(AppError::remote)?;
    print_sweep_summary(&report);
    Ok(())
}

type SweepParts = (Cluster, Box<dyn Readiness>, Box<dyn MetricsScraper>);

fn dry_run_parts(params: &ExperimentParameters) -> SweepParts {
    let readiness: Box<dyn Readiness> = Box::new(Immediate);
    let scraper: Box<dyn MetricsScraper> = Box::new(RecordingScraper::new(""));
    (Cluster::dry_run(params), readiness, scraper)
}

fn live_parts(params: &ExperimentParameters, settings: &Settings) -> AppResult<SweepParts> {
    let readiness = from_settings(&settings.readiness, settings.ports, settings.timing)
        .map_err(AppError::remote)?;
    let scraper: Box<dyn MetricsScraper> =
        Box::new(HttpScraper::new().map_err(AppError::remote)?);
    Ok((Cluster::connect(params, &settings.ssh), readiness, scraper))
}

fn print_sweep_summary(report: &SweepReport) {
    println!("Results: {}", report.output_dir.display());
    for point in &report.points {
        println!(
            "  threads {:>4}: {} started, {} failed to start, {} failed job(s), {} artifact(s) collected, {} missing",
            point.threads,
            point.launched,
            point.failed_launches,
            point.failed_jobs,
            point.collection.fetched,
            point.collection.failed
        );
    }
}

async fn run_analyze(plan: AnalyzePlan) -> AppResult<()> {
    let experiments = Experiment::load_all(&plan.experiments)
        .await
        .map_err(AppError::metrics)?;
    let analysis = Analysis::compute(&experiments);
    let written = analysis
        .write(&plan.out_dir)
        .await
        .map_err(AppError::metrics)?;

    let labels: Vec<String> = experiments
        .iter()
        .map(|experiment| experiment.label.clone())
        .collect();
    let scripts = analysis_scripts(&labels);
    write_scripts(&plan.out_dir, &scripts)
        .await
        .map_err(AppError::metrics)?;

    if plan.plot {
        let rendered = render_scripts(&plan.out_dir, &scripts).await;
        info!("gnuplot rendered {} of {} plot(s)", rendered, scripts.len());
    }

    if plan.png {
        match render_cdf_charts(analysis.cdfs.clone(), plan.out_dir.clone()).await {
            Ok(charts) => info!("Rendered {} PNG chart(s)", charts.len()),
            Err(err) => warn!("PNG chart rendering failed: {}", err),
        }
    }

    println!(
        "Wrote {} data file(s) and {} plot script(s) to {}",
        written.len(),
        scripts.len(),
        plan.out_dir.display()
    );
    Ok(())
}
