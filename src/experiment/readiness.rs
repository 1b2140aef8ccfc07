use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Ports, ReadinessMode, ReadinessSettings, Timing};
use crate::error::RemoteError;

/// Points in the experiment skeleton where the controller waits for the
/// cluster to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// After dropping page caches.
    CacheSettle,
    CoordinatorStarted,
    /// After each individual storage node launch.
    StorageNodeStarted,
    /// After every storage node is up.
    StorageStarted,
    TracesStarted,
    /// Between termination and cleanup.
    ServicesStopped,
}

/// Decides when the next orchestration step may proceed.
///
/// `hosts` names the nodes the phase concerns; implementations that only
/// pause may ignore it.
#[async_trait]
pub trait Readiness: Send + Sync + fmt::Debug {
    async fn wait(&self, phase: Phase, hosts: &[String]);
}

/// Sleeps for the configured interval of each phase.
#[derive(Debug, Clone, Copy)]
pub struct FixedPause {
    timing: Timing,
}

impl FixedPause {
    #[must_use]
    pub const fn new(timing: Timing) -> Self {
        Self { timing }
    }

    #[must_use]
    pub const fn interval(&self, phase: Phase) -> Duration {
        match phase {
            Phase::CacheSettle => self.timing.settle,
            Phase::CoordinatorStarted => self.timing.coordinator,
            Phase::StorageNodeStarted => self.timing.storage_node,
            Phase::StorageStarted => self.timing.storage,
            Phase::TracesStarted => self.timing.trace,
            Phase::ServicesStopped => self.timing.teardown,
        }
    }
}

#[async_trait]
impl Readiness for FixedPause {
    async fn wait(&self, phase: Phase, _hosts: &[String]) {
        let interval = self.interval(phase);
        debug!("Waiting {:?} after {:?}", interval, phase);
        tokio::time::sleep(interval).await;
    }
}

/// Polls service status endpoints until they answer 200.
///
/// Phases without an endpoint fall back to the fixed pause. A probe that
/// times out is logged and the run continues.
#[derive(Debug, Clone)]
pub struct StatusProbe {
    client: reqwest::Client,
    ports: Ports,
    interval: Duration,
    timeout: Duration,
    fallback: FixedPause,
}

impl StatusProbe {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(
        ports: Ports,
        settings: &ReadinessSettings,
        timing: Timing,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(settings.probe_interval.max(Duration::from_secs(1)))
            .connect_timeout(settings.probe_interval)
            .build()
            .map_err(|err| RemoteError::HttpClient { source: err })?;
        Ok(Self {
            client,
            ports,
            interval: settings.probe_interval,
            timeout: settings.probe_timeout,
            fallback: FixedPause::new(timing),
        })
    }

    /// Status URL for `host` in `phase`, if the phase has one.
    #[must_use]
    pub fn status_url(&self, phase: Phase, host: &str) -> Option<String> {
        match phase {
            Phase::CoordinatorStarted => {
                Some(format!("http://{}:{}/pd/api/v1/health", host, self.ports.pd))
            }
            Phase::StorageNodeStarted | Phase::StorageStarted => {
                Some(format!("http://{}:{}/status", host, self.ports.tikv_status))
            }
            Phase::CacheSettle | Phase::TracesStarted | Phase::ServicesStopped => None,
        }
    }

    async fn poll(&self, url: &str) -> bool {
        let deadline = Instant::now()
            .checked_add(self.timeout)
            .unwrap_or_else(Instant::now);
        loop {
            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return true,
                Ok(response) => debug!("{} answered {}", url, response.status()),
                Err(err) => debug!("{} not ready: {}", url, err),
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[async_trait]
impl Readiness for StatusProbe {
    async fn wait(&self, phase: Phase, hosts: &[String]) {
        let urls: Vec<String> = hosts
            .iter()
            .filter_map(|host| self.status_url(phase, host))
            .collect();
        if urls.is_empty() {
            self.fallback.wait(phase, hosts).await;
            return;
        }
        for url in &urls {
            if self.poll(url).await {
                info!("{} is ready", url);
            } else {
                warn!(
                    "{} did not become ready within {:?}; continuing",
                    url, self.timeout
                );
            }
        }
    }
}

/// Proceeds at once. For tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl Readiness for Immediate {
    async fn wait(&self, _phase: Phase, _hosts: &[String]) {}
}

/// Readiness strategy selected by the deployment config.
///
/// # Errors
///
/// Returns an error when probing is selected and the HTTP client cannot be
/// built.
pub fn from_settings(
    settings: &ReadinessSettings,
    ports: Ports,
    timing: Timing,
) -> Result<Box<dyn Readiness>, RemoteError> {
    match settings.mode {
        ReadinessMode::Fixed => Ok(Box::new(FixedPause::new(timing))),
        ReadinessMode::Probe => Ok(Box::new(StatusProbe::new(ports, settings, timing)?)),
    }
}
