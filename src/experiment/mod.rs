//! Experiment orchestration: parameters, remote command lines, readiness,
//! result collection, and the sweep controller.
mod cluster;
mod collect;
pub mod commands;
mod params;
mod readiness;
mod sweep;


pub use cluster::Cluster;
pub use collect::{
    CollectionSummary, HttpScraper, MetricsScraper, RecordingScraper, ResultCollector,
};
pub use params::{
    ExperimentParameters, FIELD_COUNT, WORKLOAD_SWEEP_STEP, WRITE_SCALABILITY_STEP, YcsbOptions,
};
pub use readiness::{FixedPause, Immediate, Phase, Readiness, StatusProbe, from_settings};
pub use sweep::{PointReport, SweepController, SweepReport, role_artifacts};
