use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Node list must not be empty.")]
    EmptyNodeList,
    #[error("Node list contains an empty entry: '{value}'.")]
    EmptyNodeEntry { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Value size {value_size} is too small to split into {fields} fields.")]
    ValueSizeTooSmall { value_size: u64, fields: u64 },
    #[error("--threadsmin ({min}) must not exceed --threads ({max}).")]
    ThreadBoundsInverted { min: u64, max: u64 },
    #[error("Thread count {threads} leaves no threads per client across {clients} client(s).")]
    ThreadsBelowClients { threads: u64, clients: usize },
    #[error("Invalid experiment '{value}'. Expected 'LABEL=PATH'.")]
    InvalidExperimentSpec { value: String },
    #[error("Invalid workload '{value}'. Use a single lower-case letter.")]
    InvalidWorkload { value: String },
    #[error("Experiment label must not contain '{separator}': '{value}'.")]
    InvalidLabel { value: String, separator: char },
}
