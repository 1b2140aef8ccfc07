//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{AnalyzeArgs, Command, RunArgs, SweepArgs};
pub use types::{
    ExperimentSpec, ExperimentType, NodeList, PositiveU64, PositiveUsize, WorkloadList,
};

pub(crate) use defaults::DEFAULT_CONFIG_FILES;
