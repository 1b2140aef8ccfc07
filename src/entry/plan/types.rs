use std::path::PathBuf;

use crate::args::ExperimentSpec;
use crate::config::Settings;
use crate::experiment::ExperimentParameters;

pub(in crate::entry) struct SweepPlan {
    pub(super) params: ExperimentParameters,
    pub(super) settings: Settings,
    pub(super) dry_run: bool,
}

pub(in crate::entry) struct AnalyzePlan {
    pub(super) experiments: Vec<ExperimentSpec>,
    pub(super) out_dir: PathBuf,
    pub(super) plot: bool,
    pub(super) png: bool,
}

pub(in crate::entry) enum RunPlan {
    Sweep(Box<SweepPlan>),
    Analyze(AnalyzePlan),
}
