use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to read metrics export '{path}': {source}")]
    ReadExport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write analysis output '{path}': {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No experiments given to analyze.")]
    NoExperiments,
}
