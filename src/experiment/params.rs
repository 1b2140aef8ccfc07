use std::path::{Path, PathBuf};

use crate::args::{ExperimentType, RunArgs};
use crate::config::Ports;
use crate::error::ValidationError;

const GIB: u64 = 1024 * 1024 * 1024;
const KIB: u64 = 1024;

/// Fields per load-generator record; the value is split evenly across them.
pub const FIELD_COUNT: u64 = 8;
/// Thread step of the write-scalability sweep.
pub const WRITE_SCALABILITY_STEP: u64 = 4;
/// Thread step of the workload sweep.
pub const WORKLOAD_SWEEP_STEP: u64 = 8;

/// Per-run configuration, fixed before the first remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentParameters {
    pub storage_nodes: Vec<String>,
    pub coordinator_node: String,
    pub client_nodes: Vec<String>,
    pub name: String,
    pub experiment_type: ExperimentType,
    pub value_size: u64,
    pub db_size: u64,
    pub ops: u64,
    pub threads: u64,
    pub threads_min: u64,
    pub workloads: Vec<char>,
    pub results_root: PathBuf,
}

impl ExperimentParameters {
    /// Builds and validates parameters from `kvsweep run` arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the value size cannot be split into fields,
    /// `--threadsmin` exceeds `--threads`, or the smallest sweep point leaves
    /// a client without threads.
    pub fn from_args(args: &RunArgs) -> Result<Self, ValidationError> {
        let threads = args.threads.get();
        let threads_min = args.threads_min.map_or(threads, |min| min.get());
        let params = Self {
            storage_nodes: args.tikv_nodes.hosts().to_vec(),
            coordinator_node: args.pd_node.clone(),
            client_nodes: args.client_nodes.hosts().to_vec(),
            name: args.name.trim().to_owned(),
            experiment_type: args.experiment_type,
            value_size: args.value_size.get(),
            db_size: args.db_size.get(),
            ops: args.ops.get(),
            threads,
            threads_min,
            workloads: args
                .workloads
                .as_ref()
                .map(|list| list.letters().to_vec())
                .unwrap_or_default(),
            results_root: PathBuf::from(&args.results_dir),
        };
        params.validate()?;
        Ok(params)
    }

    /// # Errors
    ///
    /// See [`ExperimentParameters::from_args`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.value_size < FIELD_COUNT {
            return Err(ValidationError::ValueSizeTooSmall {
                value_size: self.value_size,
                fields: FIELD_COUNT,
            });
        }
        if self.threads_min > self.threads {
            return Err(ValidationError::ThreadBoundsInverted {
                min: self.threads_min,
                max: self.threads,
            });
        }
        if self.client_threads(self.threads_min) == 0 {
            return Err(ValidationError::ThreadsBelowClients {
                threads: self.threads_min,
                clients: self.client_nodes.len(),
            });
        }
        Ok(())
    }

    /// `{name}-{dbSize in GiB}GB-{valueSize in KiB}KB`
    #[must_use]
    pub fn experiment_name(&self) -> String {
        format!(
            "{}-{}GB-{}KB",
            self.name,
            self.db_size / GIB,
            self.value_size / KIB
        )
    }

    /// `{results}/{experiment name}/{experiment type}`
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.results_root
            .join(self.experiment_name())
            .join(self.experiment_type.as_str())
    }

    /// Local directory for artifacts of the node at `index`.
    #[must_use]
    pub fn node_dir(output_dir: &Path, index: usize) -> PathBuf {
        output_dir.join(index.to_string())
    }

    /// Remote file receiving syscall trace output.
    #[must_use]
    pub fn strace_file(&self) -> String {
        format!("{}-{}.strace", self.experiment_name(), self.db_size)
    }

    /// Threads each client runs when the sweep is at `threads` in total.
    #[must_use]
    pub fn client_threads(&self, threads: u64) -> u64 {
        clients_divide(threads, self.client_nodes.len())
    }

    /// Sweep points from `threads_min` to `threads` inclusive.
    #[must_use]
    pub fn sweep_points(&self, step: u64) -> Vec<u64> {
        let step = usize::try_from(step.max(1)).unwrap_or(usize::MAX);
        (self.threads_min..=self.threads).step_by(step).collect()
    }

    #[must_use]
    pub fn ycsb_options(&self, ports: Ports) -> YcsbOptions {
        let field_length = self.value_size / FIELD_COUNT;
        let record_size = FIELD_COUNT.saturating_mul(field_length);
        YcsbOptions {
            coordinator: format!("{}:{}", self.coordinator_node, ports.pd),
            field_count: FIELD_COUNT,
            field_length,
            record_count: self.db_size.checked_div(record_size).unwrap_or(0),
            operation_count: clients_divide(self.ops, self.client_nodes.len()),
        }
    }
}

fn clients_divide(total: u64, clients: usize) -> u64 {
    let clients = u64::try_from(clients).unwrap_or(u64::MAX);
    total.checked_div(clients).unwrap_or(0)
}

/// Load-generator properties shared by the load and run phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YcsbOptions {
    pub coordinator: String,
    pub field_count: u64,
    pub field_length: u64,
    pub record_count: u64,
    pub operation_count: u64,
}

impl YcsbOptions {
    /// `-p` properties for a phase running `threads` threads per client.
    #[must_use]
    pub fn properties(&self, threads: u64) -> Vec<String> {
        vec![
            format!("tikv.pd={}", self.coordinator),
            "tikv.type=raw".to_owned(),
            format!("threadcount={}", threads),
            format!("fieldcount={}", self.field_count),
            format!("fieldlength={}", self.field_length),
            format!("operationcount={}", self.operation_count),
            format!("recordcount={}", self.record_count),
        ]
    }

    /// Properties of client `index`'s share of the load phase.
    #[must_use]
    pub fn load_properties(&self, threads: u64, index: usize, clients: usize) -> Vec<String> {
        let share = clients_divide(self.record_count, clients);
        let start = u64::try_from(index)
            .unwrap_or(u64::MAX)
            .saturating_mul(share);
        let mut properties = self.properties(threads);
        properties.push("dotransactions=false".to_owned());
        properties.push(format!("insertstart={}", start));
        properties.push(format!("insertcount={}", share));
        properties
    }
}
