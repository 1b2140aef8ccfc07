use std::path::PathBuf;

use crate::args::{AnalyzeArgs, Command, RunArgs, SweepArgs};
use crate::config::{Settings, load_config};
use crate::error::{AppError, AppResult};
use crate::experiment::ExperimentParameters;

use super::types::{AnalyzePlan, RunPlan, SweepPlan};

pub(crate) fn build_plan(args: SweepArgs) -> AppResult<RunPlan> {
    match args.command {
        Command::Run(run) => build_sweep(&run),
        Command::Analyze(analyze) => Ok(build_analyze(analyze)),
    }
}

fn build_sweep(run: &RunArgs) -> AppResult<RunPlan> {
    let file = load_config(run.config.as_deref())?;
    let settings = Settings::resolve(file).map_err(AppError::config)?;
    let params = ExperimentParameters::from_args(run).map_err(|err| {
        tracing::error!("Invalid experiment parameters: {}", err);
        AppError::validation(err)
    })?;
    Ok(RunPlan::Sweep(Box::new(SweepPlan {
        params,
        settings,
        dry_run: run.dry_run,
    })))
}

fn build_analyze(analyze: AnalyzeArgs) -> RunPlan {
    RunPlan::Analyze(AnalyzePlan {
        experiments: analyze.experiments,
        out_dir: PathBuf::from(analyze.out_dir),
        plot: !analyze.no_plot,
        png: analyze.png,
    })
}
