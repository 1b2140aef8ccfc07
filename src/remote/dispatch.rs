use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::RemoteError;

use super::connection::{CommandOutput, Connection, redirected};

/// Names the per-node output file of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub base_name: String,
    pub extension: String,
}

impl OutputSpec {
    #[must_use]
    pub fn new(base_name: &str, extension: &str) -> Self {
        Self {
            base_name: base_name.to_owned(),
            extension: extension.to_owned(),
        }
    }

    /// `{base}_{index}.{ext}`
    #[must_use]
    pub fn file_name(&self, index: usize) -> String {
        format!("{}_{}.{}", self.base_name, index, self.extension)
    }
}

/// One command bound to the node that runs it.
#[derive(Debug, Clone)]
pub struct Job {
    pub connection: Arc<dyn Connection>,
    pub command: String,
}

impl Job {
    #[must_use]
    pub fn new(connection: &Arc<dyn Connection>, command: String) -> Self {
        Self {
            connection: Arc::clone(connection),
            command,
        }
    }
}

/// What happened on one node of a parallel dispatch.
#[derive(Debug)]
pub struct JobOutcome {
    pub index: usize,
    pub host: String,
    pub result: Result<CommandOutput, RemoteError>,
    /// Local copy of the node's output file, if it could be fetched.
    pub artifact: Option<PathBuf>,
}

impl JobOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(output) if output.success())
    }
}

/// Runs commands on many nodes at once and collects their output files.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    remote_home: String,
    output_dir: PathBuf,
}

impl Dispatcher {
    #[must_use]
    pub fn new(remote_home: &str, output_dir: &Path) -> Self {
        Self {
            remote_home: remote_home.to_owned(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Runs the same `command` on every node.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::run_jobs`].
    pub async fn run_parallel(
        &self,
        nodes: &[Arc<dyn Connection>],
        command: &str,
        output: Option<&OutputSpec>,
    ) -> Result<Vec<JobOutcome>, RemoteError> {
        let jobs = nodes
            .iter()
            .map(|node| Job::new(node, command.to_owned()))
            .collect();
        self.run_jobs(jobs, output).await
    }

    /// Starts every job concurrently and waits for all of them.
    ///
    /// With an `output` spec each job's stdout goes to
    /// `{home}/{base}_{i}.{ext}` and, once every job has finished, each
    /// node's file is fetched into the output directory. Outcomes come back
    /// in job order. A failing node is logged and does not stop the others,
    /// and its output file is still fetched. A dispatch task that panicked
    /// is reported as that node's failed outcome.
    ///
    /// # Errors
    ///
    /// Returns an error only when the local output directory cannot be
    /// created.
    pub async fn run_jobs(
        &self,
        jobs: Vec<Job>,
        output: Option<&OutputSpec>,
    ) -> Result<Vec<JobOutcome>, RemoteError> {
        if output.is_some() {
            tokio::fs::create_dir_all(&self.output_dir)
                .await
                .map_err(|err| RemoteError::Io {
                    context: "create dispatch output directory",
                    source: err,
                })?;
        }

        let handles: Vec<_> = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| {
                let connection = Arc::clone(&job.connection);
                let command = match output {
                    Some(spec) => redirected(&job.command, &self.remote_file(spec, index)),
                    None => job.command.clone(),
                };
                debug!("{}: {}", connection.host(), command);
                tokio::spawn(async move { connection.run(&command).await })
            })
            .collect();

        let results = join_all(handles).await;

        let mut outcomes = Vec::with_capacity(jobs.len());
        for ((index, job), joined) in jobs.iter().enumerate().zip(results) {
            let host = job.connection.host().to_owned();
            let result = joined.unwrap_or_else(|err| Err(RemoteError::from(err)));
            match &result {
                Ok(out) if out.success() => debug!("Job {} on {} finished", index, host),
                Ok(out) => warn!(
                    "Job {} on {} finished with {}: {}",
                    index,
                    host,
                    out.status_label(),
                    out.stderr.trim()
                ),
                Err(err) => warn!("Job {} on {} failed: {}", index, host, err),
            }

            let artifact = match output {
                Some(spec) => self.retrieve(job, spec, index).await,
                None => None,
            };
            outcomes.push(JobOutcome {
                index,
                host,
                result,
                artifact,
            });
        }
        Ok(outcomes)
    }

    fn remote_file(&self, spec: &OutputSpec, index: usize) -> String {
        format!("{}/{}", self.remote_home, spec.file_name(index))
    }

    async fn retrieve(&self, job: &Job, spec: &OutputSpec, index: usize) -> Option<PathBuf> {
        let local_file = self.output_dir.join(spec.file_name(index));
        match job
            .connection
            .fetch(&self.remote_file(spec, index), &local_file)
            .await
        {
            Ok(()) => Some(local_file),
            Err(err) => {
                warn!(
                    "Could not fetch output of job {} from {}: {}",
                    index,
                    job.connection.host(),
                    err
                );
                None
            }
        }
    }
}
