use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("gnuplot not found. Please install gnuplot.")]
    GnuplotMissing,
    #[error("Failed to run gnuplot: {source}")]
    GnuplotIo {
        #[source]
        source: std::io::Error,
    },
    #[error("gnuplot exited with {status}: {stderr}")]
    GnuplotFailed { status: String, stderr: String },
    #[error("Chart rendering failed for '{path}': {message}")]
    Render { path: PathBuf, message: String },
}
