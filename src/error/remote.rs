use std::path::PathBuf;
use thiserror::Error;

/// Failures of the remote execution transport.
///
/// A non-zero exit status is only an error for commands that are run in
/// checked mode; dispatched jobs report it through their outcome instead.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to spawn '{program}' for {host}: {source}")]
    Spawn {
        host: String,
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Command on {host} exited with {status}: {command}\nstderr: {stderr}")]
    CommandFailed {
        host: String,
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Launch of '{name}' on {host} did not report a process id (stdout: '{stdout}').")]
    MissingPid {
        host: String,
        name: String,
        stdout: String,
    },
    #[error("Failed to fetch {host}:{remote} into '{local}': {reason}")]
    Fetch {
        host: String,
        remote: String,
        local: PathBuf,
        reason: String,
    },
    #[error("Failed to scrape metrics from {url}: {source}")]
    Scrape {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Metrics endpoint {url} answered with status {status}.")]
    ScrapeStatus { url: String, status: u16 },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Dispatch task failed: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
}
