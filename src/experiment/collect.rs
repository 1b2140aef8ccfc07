use std::fmt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::RemoteError;
use crate::remote::{Role, ServiceHandle, ServiceRegistry, split_service_name};

use super::params::ExperimentParameters;

/// Fetches a metrics export body over HTTP.
#[async_trait]
pub trait MetricsScraper: Send + Sync + fmt::Debug {
    async fn scrape(&self, url: &str) -> Result<String, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new() -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| RemoteError::HttpClient { source: err })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MetricsScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<String, RemoteError> {
        let scrape_error = |err| RemoteError::Scrape {
            url: url.to_owned(),
            source: err,
        };
        let response = self.client.get(url).send().await.map_err(scrape_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::ScrapeStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(scrape_error)
    }
}

/// Scraper answering every URL with a fixed body and remembering the URLs.
#[derive(Debug, Default)]
pub struct RecordingScraper {
    body: String,
    urls: Mutex<Vec<String>>,
}

impl RecordingScraper {
    #[must_use]
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_owned(),
            urls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MetricsScraper for RecordingScraper {
    async fn scrape(&self, url: &str) -> Result<String, RemoteError> {
        info!("[dry-run] scrape {}", url);
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
        Ok(self.body.clone())
    }
}

/// Counts of what one collection pass retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub fetched: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CollectionSummary {
    fn record<T>(&mut self, result: Result<T, RemoteError>, what: &str) {
        match result {
            Ok(_) => self.fetched = self.fetched.saturating_add(1),
            Err(err) => {
                warn!("Could not collect {}: {}", what, err);
                self.failed = self.failed.saturating_add(1);
            }
        }
    }
}

/// Copies logs, traces and metrics snapshots of every registered service
/// into `{output}/{node index}/`.
#[derive(Debug, Clone)]
pub struct ResultCollector {
    home: String,
    status_port: u16,
    strace_file: String,
    block_device: String,
    blktrace_files: usize,
}

impl ResultCollector {
    #[must_use]
    pub fn new(params: &ExperimentParameters, settings: &Settings) -> Self {
        Self {
            home: settings.paths.home.clone(),
            status_port: settings.ports.tikv_status,
            strace_file: params.strace_file(),
            block_device: settings.storage.block_device.clone(),
            blktrace_files: settings.storage.blktrace_files,
        }
    }

    /// Collects results of the sweep point at `threads`.
    ///
    /// Missing remote files and failed scrapes are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns an error when a local node directory or snapshot file cannot
    /// be written.
    pub async fn collect(
        &self,
        registry: &ServiceRegistry,
        scraper: &dyn MetricsScraper,
        output_dir: &Path,
        threads: u64,
    ) -> Result<CollectionSummary, RemoteError> {
        let mut summary = CollectionSummary::default();
        for handle in registry.iter() {
            let parsed = split_service_name(handle.name())
                .and_then(|(prefix, index)| Role::from_prefix(prefix).map(|role| (role, index)));
            let Some((role, index)) = parsed else {
                warn!("Tried to collect output from unknown service '{}'", handle.name());
                summary.skipped = summary.skipped.saturating_add(1);
                continue;
            };

            let node_dir = ExperimentParameters::node_dir(output_dir, index);
            tokio::fs::create_dir_all(&node_dir)
                .await
                .map_err(|err| RemoteError::Io {
                    context: "create node result directory",
                    source: err,
                })?;

            match role {
                Role::Storage => {
                    let log = self
                        .fetch(handle, "tikv.log", &node_dir, &format!("tikv-{}.log", threads))
                        .await;
                    summary.record(log, "storage log");
                    let metrics = self
                        .snapshot(handle, scraper, &node_dir, threads)
                        .await?;
                    summary.record(metrics, "metrics snapshot");
                }
                Role::Coordinator => {
                    let log = self.fetch(handle, "pd.log", &node_dir, "pd.log").await;
                    summary.record(log, "coordinator log");
                }
                Role::Strace => {
                    let trace = self
                        .fetch(handle, &self.strace_file, &node_dir, "strace.out")
                        .await;
                    summary.record(trace, "syscall trace");
                }
                Role::Blktrace => {
                    for cpu in 0..self.blktrace_files {
                        let file = format!("{}.blktrace.{}", self.block_device, cpu);
                        let trace = self.fetch(handle, &file, &node_dir, &file).await;
                        summary.record(trace, "block trace");
                    }
                }
            }
        }
        info!(
            "Collected {} artifact(s), {} failed, {} skipped",
            summary.fetched, summary.failed, summary.skipped
        );
        Ok(summary)
    }

    async fn fetch(
        &self,
        handle: &ServiceHandle,
        remote_file: &str,
        node_dir: &Path,
        local_file: &str,
    ) -> Result<(), RemoteError> {
        let remote = format!("{}/{}", self.home, remote_file);
        let local = node_dir.join(local_file);
        debug!("Fetching {}:{}", handle.connection().host(), remote);
        handle.connection().fetch(&remote, &local).await
    }

    /// Outer error: local write failure. Inner error: scrape failure.
    async fn snapshot(
        &self,
        handle: &ServiceHandle,
        scraper: &dyn MetricsScraper,
        node_dir: &Path,
        threads: u64,
    ) -> Result<Result<(), RemoteError>, RemoteError> {
        let url = format!(
            "http://{}:{}/metrics",
            handle.connection().host(),
            self.status_port
        );
        let body = match scraper.scrape(&url).await {
            Ok(body) => body,
            Err(err) => return Ok(Err(err)),
        };
        let path = node_dir.join(format!("tikv-{}.metrics", threads));
        tokio::fs::write(&path, body)
            .await
            .map_err(|err| RemoteError::Io {
                context: "write metrics snapshot",
                source: err,
            })?;
        Ok(Ok(()))
    }
}
