use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::SshSettings;
use crate::error::RemoteError;

use super::connection::{CommandOutput, Connection};

/// Connection backed by the system `ssh` and `scp` clients.
///
/// Runs non-interactively (`BatchMode=yes`), so key-based authentication must
/// already be set up for `user@host`.
#[derive(Debug, Clone)]
pub struct SshConnection {
    host: String,
    settings: SshSettings,
}

impl SshConnection {
    #[must_use]
    pub fn new(host: &str, settings: &SshSettings) -> Self {
        Self {
            host: host.to_owned(),
            settings: settings.clone(),
        }
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.settings.user, self.host)
    }

    fn common_options(&self, command: &mut Command) {
        command.args(["-o", "BatchMode=yes", "-o", "StrictHostKeyChecking=accept-new"]);
        if let Some(identity) = self.settings.identity.as_deref() {
            command.arg("-i").arg(identity);
        }
    }
}

#[async_trait]
impl Connection for SshConnection {
    fn host(&self) -> &str {
        &self.host
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        debug!("ssh {}: {}", self.host, command);
        let mut ssh = Command::new("ssh");
        self.common_options(&mut ssh);
        ssh.arg("-p")
            .arg(self.settings.port.to_string())
            .arg(self.destination())
            .arg("--")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = ssh.output().await.map_err(|err| RemoteError::Spawn {
            host: self.host.clone(),
            program: "ssh",
            source: err,
        })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn fetch(&self, remote_path: &str, local_path: &Path) -> Result<(), RemoteError> {
        debug!(
            "scp {}:{} -> {}",
            self.host,
            remote_path,
            local_path.display()
        );
        let mut scp = Command::new("scp");
        scp.arg("-q");
        self.common_options(&mut scp);
        scp.arg("-P")
            .arg(self.settings.port.to_string())
            .arg(format!("{}:{}", self.destination(), remote_path))
            .arg(local_path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = scp.output().await.map_err(|err| RemoteError::Spawn {
            host: self.host.clone(),
            program: "scp",
            source: err,
        })?;
        if output.status.success() {
            return Ok(());
        }
        Err(RemoteError::Fetch {
            host: self.host.clone(),
            remote: remote_path.to_owned(),
            local: local_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}
