use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::info;

use crate::error::RemoteError;

use super::connection::{CommandOutput, Connection};

const FIRST_FAKE_PID: u32 = 10_000;

/// Connection that records commands instead of executing them.
///
/// Backs `--dry-run` and the test suites. Responses are scripted by
/// substring rules: the first matching failure rule wins, otherwise the
/// first matching stdout rule, otherwise a detached launch gets a fresh fake
/// pid and everything else succeeds silently.
#[derive(Debug)]
pub struct RecordingConnection {
    host: String,
    unreachable: bool,
    materialize_fetches: bool,
    failures: Vec<(String, i32)>,
    fetch_failures: Vec<String>,
    stdout_rules: Vec<(String, String)>,
    state: Mutex<RecordedState>,
}

#[derive(Debug, Default)]
struct RecordedState {
    commands: Vec<String>,
    fetches: Vec<(String, PathBuf)>,
    next_pid: u32,
}

impl RecordingConnection {
    #[must_use]
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_owned(),
            unreachable: false,
            materialize_fetches: false,
            failures: Vec::new(),
            fetch_failures: Vec::new(),
            stdout_rules: Vec::new(),
            state: Mutex::new(RecordedState {
                next_pid: FIRST_FAKE_PID,
                ..RecordedState::default()
            }),
        }
    }

    /// Commands containing `pattern` exit with `code`.
    #[must_use]
    pub fn failing_on(mut self, pattern: &str, code: i32) -> Self {
        self.failures.push((pattern.to_owned(), code));
        self
    }

    /// Fetches of remote paths containing `pattern` fail.
    #[must_use]
    pub fn failing_fetch(mut self, pattern: &str) -> Self {
        self.fetch_failures.push(pattern.to_owned());
        self
    }

    /// Commands containing `pattern` print `stdout`.
    #[must_use]
    pub fn answering(mut self, pattern: &str, stdout: &str) -> Self {
        self.stdout_rules
            .push((pattern.to_owned(), stdout.to_owned()));
        self
    }

    /// Every command fails at the transport level.
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Successful fetches write a small placeholder file locally.
    #[must_use]
    pub const fn materializing_fetches(mut self) -> Self {
        self.materialize_fetches = true;
        self
    }

    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    /// Remote paths fetched so far, in order.
    #[must_use]
    pub fn fetched_paths(&self) -> Vec<String> {
        self.lock()
            .fetches
            .iter()
            .map(|(remote, _)| remote.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, RecordedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unreachable_error(&self, program: &'static str) -> RemoteError {
        RemoteError::Spawn {
            host: self.host.clone(),
            program,
            source: std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "host unreachable",
            ),
        }
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn host(&self) -> &str {
        &self.host
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        if self.unreachable {
            return Err(self.unreachable_error("ssh"));
        }
        info!("[dry-run] {}: {}", self.host, command);
        let mut state = self.lock();
        state.commands.push(command.to_owned());

        if let Some((_, code)) = self
            .failures
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
        {
            return Ok(CommandOutput {
                code: Some(*code),
                stdout: String::new(),
                stderr: format!("simulated failure of '{}'", command),
            });
        }

        if let Some((_, stdout)) = self
            .stdout_rules
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
        {
            return Ok(CommandOutput {
                code: Some(0),
                stdout: stdout.clone(),
                stderr: String::new(),
            });
        }

        let stdout = if command.ends_with("echo $!") {
            let pid = state.next_pid;
            state.next_pid = pid.saturating_add(1);
            format!("{}\n", pid)
        } else {
            String::new()
        };
        Ok(CommandOutput {
            code: Some(0),
            stdout,
            stderr: String::new(),
        })
    }

    async fn fetch(&self, remote_path: &str, local_path: &Path) -> Result<(), RemoteError> {
        if self.unreachable {
            return Err(self.unreachable_error("scp"));
        }
        info!(
            "[dry-run] fetch {}:{} -> {}",
            self.host,
            remote_path,
            local_path.display()
        );
        self.lock()
            .fetches
            .push((remote_path.to_owned(), local_path.to_path_buf()));

        if self
            .fetch_failures
            .iter()
            .any(|pattern| remote_path.contains(pattern.as_str()))
        {
            return Err(RemoteError::Fetch {
                host: self.host.clone(),
                remote: remote_path.to_owned(),
                local: local_path.to_path_buf(),
                reason: "No such file or directory".to_owned(),
            });
        }

        if self.materialize_fetches {
            let body = format!("{}:{}\n", self.host, remote_path);
            tokio::fs::write(local_path, body)
                .await
                .map_err(|err| RemoteError::Io {
                    context: "write fetched placeholder",
                    source: err,
                })?;
        }
        Ok(())
    }
}
