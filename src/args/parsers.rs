use super::types::{ExperimentSpec, NodeList, PositiveU64, WorkloadList};
use crate::error::ValidationError;

pub(super) fn parse_positive_u64(s: &str) -> Result<PositiveU64, ValidationError> {
    s.parse::<PositiveU64>()
}

pub(super) fn parse_node_list(s: &str) -> Result<NodeList, ValidationError> {
    s.parse::<NodeList>()
}

pub(super) fn parse_workloads(s: &str) -> Result<WorkloadList, ValidationError> {
    s.parse::<WorkloadList>()
}

pub(super) fn parse_experiment_spec(s: &str) -> Result<ExperimentSpec, ValidationError> {
    s.parse::<ExperimentSpec>()
}

pub(super) fn parse_host(s: &str) -> Result<String, ValidationError> {
    let host = s.trim();
    if host.is_empty() {
        return Err(ValidationError::EmptyNodeList);
    }
    Ok(host.to_owned())
}
