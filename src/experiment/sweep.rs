use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::args::ExperimentType;
use crate::config::Settings;
use crate::error::RemoteError;
use crate::remote::{
    Connection, Dispatcher, Job, JobOutcome, OutputSpec, Role, RoleArtifacts, ServiceLifecycle,
    ServiceRegistry, run_checked,
};

use super::cluster::Cluster;
use super::collect::{CollectionSummary, MetricsScraper, ResultCollector};
use super::commands::{
    COORDINATOR_LAUNCH_LOG, DROP_CACHES, SERVER_PID_PROBE, YcsbPhase, blktrace_command,
    coordinator_command, load_output_base, run_output_base, server_pid, storage_command,
    storage_launch_log, strace_command, ycsb_command,
};
use super::params::{ExperimentParameters, WORKLOAD_SWEEP_STEP, WRITE_SCALABILITY_STEP};
use super::readiness::{Phase, Readiness};

/// Output extension of load-generator logs.
const YCSB_EXTENSION: &str = "ycsb";
/// Workload used by the load phase.
const LOAD_WORKLOAD: char = 'a';

/// What happened during one pass of the start/stop skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointReport {
    /// Thread count the collected files are named after (0 for single runs).
    pub threads: u64,
    pub launched: usize,
    pub failed_launches: usize,
    pub failed_jobs: usize,
    pub collection: CollectionSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub output_dir: PathBuf,
    pub points: Vec<PointReport>,
}

/// Drives the experiment skeleton across the configured sweep.
///
/// Owns the service registry for the run. Every step is best effort: launch
/// and dispatch failures are logged and counted, and teardown always runs.
/// Only local I/O failures abort the run.
#[derive(Debug)]
pub struct SweepController {
    params: ExperimentParameters,
    settings: Settings,
    cluster: Cluster,
    readiness: Box<dyn Readiness>,
    scraper: Box<dyn MetricsScraper>,
    lifecycle: ServiceLifecycle,
    collector: ResultCollector,
    dispatcher: Dispatcher,
    registry: ServiceRegistry,
    output_dir: PathBuf,
}

impl SweepController {
    #[must_use]
    pub fn new(
        params: ExperimentParameters,
        settings: Settings,
        cluster: Cluster,
        readiness: Box<dyn Readiness>,
        scraper: Box<dyn MetricsScraper>,
    ) -> Self {
        let output_dir = params.output_dir();
        let lifecycle = ServiceLifecycle::new(role_artifacts(&params, &settings));
        let collector = ResultCollector::new(&params, &settings);
        let dispatcher = Dispatcher::new(&settings.paths.home, &output_dir);
        Self {
            params,
            settings,
            cluster,
            readiness,
            scraper,
            lifecycle,
            collector,
            dispatcher,
            registry: ServiceRegistry::new(),
            output_dir,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Runs the whole experiment.
    ///
    /// # Errors
    ///
    /// Returns an error when the output directory or a collected file cannot
    /// be written locally.
    pub async fn run(&mut self) -> Result<SweepReport, RemoteError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|err| RemoteError::Io {
                context: "create experiment output directory",
                source: err,
            })?;
        info!(
            "Experiment {} ({}) writing to {}",
            self.params.experiment_name(),
            self.params.experiment_type.as_str(),
            self.output_dir.display()
        );

        let mut points = Vec::new();
        match self.params.experiment_type {
            ExperimentType::WriteScalability => {
                for threads in self.params.sweep_points(WRITE_SCALABILITY_STEP) {
                    info!("Write scalability point: {} threads", threads);
                    points.push(self.write_point(threads).await?);
                }
            }
            ExperimentType::Ycsb | ExperimentType::DiskMeasurement => {
                points.push(self.single_run().await?);
            }
        }

        Ok(SweepReport {
            output_dir: self.output_dir.clone(),
            points,
        })
    }

    /// One sweep point on a freshly started cluster, load phase only.
    ///
    /// The point is torn down even when a step fails; the first error is
    /// returned afterwards.
    async fn write_point(&mut self, threads: u64) -> Result<PointReport, RemoteError> {
        let mut report = PointReport {
            threads,
            ..PointReport::default()
        };
        let driven = self.drive_write_point(threads, &mut report).await;
        let finished = self.finish_point(threads).await;
        report.failed_jobs = driven?;
        report.collection = finished?;
        Ok(report)
    }

    async fn drive_write_point(
        &mut self,
        threads: u64,
        report: &mut PointReport,
    ) -> Result<usize, RemoteError> {
        let dropped = self.drop_caches().await?;
        self.start_cluster(report).await;
        let client_threads = self.params.client_threads(threads);
        Ok(dropped.saturating_add(self.load(client_threads).await?))
    }

    /// One cluster for the whole run: optional tracing, load, then the
    /// workload list. Teardown runs whether or not those steps fail.
    async fn single_run(&mut self) -> Result<PointReport, RemoteError> {
        let mut report = PointReport::default();
        let driven = self.drive_single_run(&mut report).await;
        let finished = self.finish_point(0).await;
        report.failed_jobs = driven?;
        report.collection = finished?;
        Ok(report)
    }

    async fn drive_single_run(&mut self, report: &mut PointReport) -> Result<usize, RemoteError> {
        self.start_cluster(report).await;

        if self.params.experiment_type == ExperimentType::DiskMeasurement {
            self.start_traces(report).await;
            self.wait(Phase::TracesStarted, &self.params.storage_nodes)
                .await;
        }

        let client_threads = self.params.client_threads(self.params.threads);
        let mut failures = self.load(client_threads).await?;

        if self.params.experiment_type == ExperimentType::Ycsb {
            failures = failures.saturating_add(self.run_workloads().await?);
        }
        Ok(failures)
    }

    async fn start_cluster(&mut self, report: &mut PointReport) {
        let coordinator = Arc::clone(&self.cluster.coordinator);
        let command = coordinator_command(&self.params, &self.settings);
        let log = self.settings.paths.in_home(COORDINATOR_LAUNCH_LOG);
        self.launch(&coordinator, &command, &Role::Coordinator.service_name(0), &log, report)
            .await;
        self.wait(Phase::CoordinatorStarted, &[coordinator.host().to_owned()])
            .await;

        for (index, node) in self.cluster.storage.clone().iter().enumerate() {
            let command = storage_command(&self.params, &self.settings, node.host());
            let log = self.settings.paths.in_home(&storage_launch_log(index));
            self.launch(node, &command, &Role::Storage.service_name(index), &log, report)
                .await;
            self.wait(Phase::StorageNodeStarted, &[node.host().to_owned()])
                .await;
        }
        self.wait(Phase::StorageStarted, &self.params.storage_nodes)
            .await;
    }

    /// Starts syscall and block-layer tracing on every storage node.
    async fn start_traces(&mut self, report: &mut PointReport) {
        let trace_file = self.params.strace_file();
        let blktrace = blktrace_command(&self.settings.storage.block_device);
        for (index, node) in self.cluster.storage.clone().iter().enumerate() {
            let probe = match run_checked(node.as_ref(), SERVER_PID_PROBE).await {
                Ok(output) => output.stdout,
                Err(err) => {
                    warn!("Could not find storage server on {}: {}", node.host(), err);
                    report.failed_launches = report.failed_launches.saturating_add(2);
                    continue;
                }
            };
            match server_pid(&probe) {
                Some(pid) => {
                    if let Some(wrapper) = self.registry.get(&Role::Storage.service_name(index)) {
                        info!("Scope pid {} storage server pid {}", wrapper.pid(), pid);
                    }
                    let strace = strace_command(&trace_file, pid);
                    let log = self.settings.paths.in_home(&format!("strace-{}.log", index));
                    self.launch(node, &strace, &Role::Strace.service_name(index), &log, report)
                        .await;
                }
                None => {
                    warn!("No storage server process on {}; skipping strace", node.host());
                    report.failed_launches = report.failed_launches.saturating_add(1);
                }
            }
            let log = self
                .settings
                .paths
                .in_home(&format!("blktrace-{}.summary", index));
            self.launch(node, &blktrace, &Role::Blktrace.service_name(index), &log, report)
                .await;
        }
    }

    async fn launch(
        &mut self,
        node: &Arc<dyn Connection>,
        command: &str,
        name: &str,
        log_file: &str,
        report: &mut PointReport,
    ) {
        match self
            .lifecycle
            .launch(&mut self.registry, node, command, name, log_file)
            .await
        {
            Ok(_) => report.launched = report.launched.saturating_add(1),
            Err(err) => {
                warn!("Failed to start {}: {}", name, err);
                report.failed_launches = report.failed_launches.saturating_add(1);
            }
        }
    }

    /// Returns the number of storage nodes where the drop failed.
    async fn drop_caches(&self) -> Result<usize, RemoteError> {
        let outcomes = self
            .dispatcher
            .run_parallel(&self.cluster.storage, DROP_CACHES, None)
            .await?;
        self.wait(Phase::CacheSettle, &self.params.storage_nodes)
            .await;
        Ok(failed(&outcomes))
    }

    /// Load phase: every client inserts its own slice of the key space.
    async fn load(&self, client_threads: u64) -> Result<usize, RemoteError> {
        let options = self.params.ycsb_options(self.settings.ports);
        let clients = self.cluster.clients.len();
        let jobs = self
            .cluster
            .clients
            .iter()
            .enumerate()
            .map(|(index, client)| {
                let properties = options.load_properties(client_threads, index, clients);
                let command =
                    ycsb_command(&self.settings, YcsbPhase::Load, LOAD_WORKLOAD, &properties);
                Job::new(client, command)
            })
            .collect();
        let output = OutputSpec::new(&load_output_base(client_threads), YCSB_EXTENSION);
        let outcomes = self.dispatcher.run_jobs(jobs, Some(&output)).await?;
        Ok(failed(&outcomes))
    }

    /// Workload sweep: every workload at every thread count, cold caches
    /// before each.
    async fn run_workloads(&self) -> Result<usize, RemoteError> {
        let options = self.params.ycsb_options(self.settings.ports);
        let mut failures = 0_usize;
        for threads in self.params.sweep_points(WORKLOAD_SWEEP_STEP) {
            let client_threads = self.params.client_threads(threads);
            let properties = options.properties(client_threads);
            for &workload in &self.params.workloads {
                failures = failures.saturating_add(self.drop_caches().await?);
                info!("Workload {} at {} threads per client", workload, client_threads);
                let command = ycsb_command(&self.settings, YcsbPhase::Run, workload, &properties);
                let output =
                    OutputSpec::new(&run_output_base(workload, client_threads), YCSB_EXTENSION);
                let outcomes = self
                    .dispatcher
                    .run_parallel(&self.cluster.clients, &command, Some(&output))
                    .await?;
                failures = failures.saturating_add(failed(&outcomes));
            }
        }
        Ok(failures)
    }

    /// Collect, stop in teardown order, pause, clean up, then retire every
    /// handle of this point.
    async fn finish_point(&mut self, threads: u64) -> Result<CollectionSummary, RemoteError> {
        let collected = self
            .collector
            .collect(&self.registry, self.scraper.as_ref(), &self.output_dir, threads)
            .await;

        self.lifecycle.terminate_all(&self.registry).await;
        self.wait(Phase::ServicesStopped, &[]).await;
        self.lifecycle.cleanup_all(&self.registry).await;
        self.registry.clear();

        collected
    }

    async fn wait(&self, phase: Phase, hosts: &[String]) {
        self.readiness.wait(phase, hosts).await;
    }
}

fn failed(outcomes: &[JobOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|outcome| !outcome.succeeded())
        .count()
}

/// Remote files each role leaves behind.
#[must_use]
pub fn role_artifacts(params: &ExperimentParameters, settings: &Settings) -> RoleArtifacts {
    let paths = &settings.paths;
    RoleArtifacts::new()
        .with(
            Role::Storage,
            vec![paths.in_home("tikv.log"), paths.in_data("tikv-data")],
        )
        .with(
            Role::Coordinator,
            vec![paths.in_home("pd.log"), paths.in_data("pd")],
        )
        .with(Role::Strace, vec![paths.in_home(&params.strace_file())])
        .with(
            Role::Blktrace,
            vec![paths.in_home(&format!("{}.blktrace.*", settings.storage.block_device))],
        )
}
