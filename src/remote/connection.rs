use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::RemoteError;

/// Captured result of one remote shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    #[must_use]
    pub fn status_label(&self) -> String {
        self.code
            .map_or_else(|| "signal".to_owned(), |code| format!("exit code {}", code))
    }
}

/// Handle to a remote host that can run shell commands and hand back files.
///
/// Commands are plain shell strings; quoting is the caller's job. A
/// connection is owned by whoever built the cluster and is shared with the
/// registry and dispatcher through `Arc`.
#[async_trait]
pub trait Connection: Send + Sync + fmt::Debug {
    /// Host name or address used in logs and error messages.
    fn host(&self) -> &str;

    /// Runs `command` to completion and reports its exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only when the command could not be dispatched at
    /// all; a non-zero exit status is reported through [`CommandOutput`].
    async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError>;

    /// Copies `remote_path` from the host into `local_path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the transfer fails or the remote file is absent.
    async fn fetch(&self, remote_path: &str, local_path: &Path) -> Result<(), RemoteError>;
}

/// Runs `command` and turns a non-zero exit status into an error.
///
/// # Errors
///
/// Returns an error when dispatch fails or the command exits unsuccessfully.
pub async fn run_checked(
    connection: &dyn Connection,
    command: &str,
) -> Result<CommandOutput, RemoteError> {
    let output = connection.run(command).await?;
    if output.success() {
        return Ok(output);
    }
    Err(RemoteError::CommandFailed {
        host: connection.host().to_owned(),
        command: command.to_owned(),
        status: output.status_label(),
        stderr: output.stderr.trim().to_owned(),
    })
}

/// Wraps `command` so it survives the session, with all output in `log_file`,
/// and prints the background pid.
#[must_use]
pub fn detached(command: &str, log_file: &str) -> String {
    format!(
        "nohup {} < /dev/null > {} 2>&1 & echo $!",
        command, log_file
    )
}

/// Redirects `command`'s stdout into `path`.
#[must_use]
pub fn redirected(command: &str, path: &str) -> String {
    format!("{} > {}", command, path)
}
