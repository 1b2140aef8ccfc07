use clap::{Args, Parser, Subcommand};

use super::defaults::{
    DEFAULT_DB_SIZE, DEFAULT_OPS, DEFAULT_RESULTS_DIR, DEFAULT_THREADS, DEFAULT_VALUE_SIZE,
};
use super::parsers::{
    parse_experiment_spec, parse_host, parse_node_list, parse_positive_u64, parse_workloads,
};
use super::types::{ExperimentSpec, ExperimentType, NodeList, PositiveU64, WorkloadList};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Benchmark orchestration and histogram analysis for distributed key-value write paths."
)]
pub struct SweepArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (overridden by KVSWEEP_LOG / RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Provision the cluster, drive the load generator, and collect results
    Run(RunArgs),
    /// Reduce collected metrics snapshots into waterfall and CDF data and plots
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Storage node IPs as comma-separated list
    #[arg(long = "tikv_nodes", alias = "tikv-nodes", value_parser = parse_node_list)]
    pub tikv_nodes: NodeList,

    /// Coordinator (PD) IP
    #[arg(long = "pd_node", alias = "pd-node", value_parser = parse_host)]
    pub pd_node: String,

    /// Client IPs as comma-separated list
    #[arg(long = "client_nodes", alias = "client-nodes", value_parser = parse_node_list)]
    pub client_nodes: NodeList,

    /// Value size in bytes
    #[arg(short = 'v', long = "vsize", default_value = DEFAULT_VALUE_SIZE, value_parser = parse_positive_u64)]
    pub value_size: PositiveU64,

    /// Database size in bytes
    #[arg(short = 's', long = "db_size", alias = "db-size", default_value = DEFAULT_DB_SIZE, value_parser = parse_positive_u64)]
    pub db_size: PositiveU64,

    /// Workload operations, split across client nodes
    #[arg(short = 'o', long = "ops", default_value = DEFAULT_OPS, value_parser = parse_positive_u64)]
    pub ops: PositiveU64,

    /// Load generator threads, split across client nodes
    #[arg(short = 'r', long = "threads", default_value = DEFAULT_THREADS, value_parser = parse_positive_u64)]
    pub threads: PositiveU64,

    /// Minimum threads for scalability sweeps (defaults to --threads)
    #[arg(long = "threadsmin", value_parser = parse_positive_u64)]
    pub threads_min: Option<PositiveU64>,

    /// Experiment name (used in the results directory)
    #[arg(short = 'n', long = "name", default_value = "")]
    pub name: String,

    /// Experiment type
    #[arg(long = "experimenttype", alias = "experiment-type")]
    pub experiment_type: ExperimentType,

    /// Load generator workloads by lower-case letter as comma-separated list
    #[arg(long = "workloads", value_parser = parse_workloads)]
    pub workloads: Option<WorkloadList>,

    /// Root directory for experiment results
    #[arg(long = "results-dir", default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: String,

    /// Deployment config file (.toml or .json)
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Log every remote command instead of executing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Experiment metrics snapshot as LABEL=PATH (repeatable, order is kept)
    #[arg(long = "experiment", short = 'e', required = true, value_parser = parse_experiment_spec)]
    pub experiments: Vec<ExperimentSpec>,

    /// Directory receiving .dat files, plot scripts and charts
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: String,

    /// Write data files and scripts without invoking gnuplot
    #[arg(long = "no-plot")]
    pub no_plot: bool,

    /// Also render PNG CDF charts natively
    #[arg(long = "png")]
    pub png: bool,
}
