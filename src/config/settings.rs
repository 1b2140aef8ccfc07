use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

use super::types::{ConfigFile, ReadinessMode};

const DEFAULT_EXE_ROOT: &str = "/software";
const DEFAULT_DATA_ROOT: &str = "/mnt/data";
const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_MEMORY_MAX: &str = "32G";
const DEFAULT_BLOCK_DEVICE: &str = "sdb";
const DEFAULT_BLKTRACE_FILES: usize = 32;
const DEFAULT_PROBE_INTERVAL_MS: u64 = 500;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

/// Deployment constants for one run, resolved from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub paths: RemotePaths,
    pub ports: Ports,
    pub ssh: SshSettings,
    pub timing: Timing,
    pub readiness: ReadinessSettings,
    pub storage: StorageSettings,
}

/// Where binaries, data directories and logs live on every remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePaths {
    pub home: String,
    pub exe: String,
    pub data: String,
}

impl RemotePaths {
    #[must_use]
    pub fn ycsb_home(&self) -> String {
        format!("{}/go-ycsb", self.exe)
    }

    #[must_use]
    pub fn ycsb_exe(&self) -> String {
        format!("{}/bin/go-ycsb", self.ycsb_home())
    }

    /// Workload files are this prefix followed by the workload letter.
    #[must_use]
    pub fn workload_prefix(&self) -> String {
        format!("{}/workloads/workload", self.ycsb_home())
    }

    #[must_use]
    pub fn tikv_exe(&self) -> String {
        format!("{}/tikv-xll/target/release/tikv-server", self.exe)
    }

    #[must_use]
    pub fn pd_exe(&self) -> String {
        format!("{}/pd/bin/pd-server", self.exe)
    }

    #[must_use]
    pub fn in_home(&self, file: &str) -> String {
        format!("{}/{}", self.home, file)
    }

    #[must_use]
    pub fn in_data(&self, dir: &str) -> String {
        format!("{}/{}", self.data, dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    pub pd: u16,
    pub pd_peer: u16,
    pub tikv_addr: u16,
    pub tikv_status: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            pd: 2379,
            pd_peer: 2380,
            tikv_addr: 20160,
            tikv_status: 20180,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSettings {
    pub user: String,
    pub port: u16,
    pub identity: Option<PathBuf>,
}

/// Fixed waits between orchestration steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle: Duration,
    pub coordinator: Duration,
    pub storage_node: Duration,
    pub storage: Duration,
    pub trace: Duration,
    pub teardown: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            coordinator: Duration::from_secs(8),
            storage_node: Duration::from_secs(3),
            storage: Duration::from_secs(8),
            trace: Duration::from_secs(2),
            teardown: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessSettings {
    pub mode: ReadinessMode,
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub memory_max: String,
    pub block_device: String,
    pub blktrace_files: usize,
}

impl Settings {
    /// Resolves a parsed config file (or none) into concrete settings.
    ///
    /// # Errors
    ///
    /// Returns an error when a count or interval is configured as zero.
    pub fn resolve(file: Option<ConfigFile>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let user = file
            .ssh
            .as_ref()
            .and_then(|ssh| ssh.user.clone())
            .unwrap_or_else(local_user);

        let paths = file.paths.unwrap_or_default();
        let paths = RemotePaths {
            home: paths.home.unwrap_or_else(|| default_home(&user)),
            exe: paths.exe.unwrap_or_else(|| DEFAULT_EXE_ROOT.to_owned()),
            data: paths.data.unwrap_or_else(|| DEFAULT_DATA_ROOT.to_owned()),
        };

        let default_ports = Ports::default();
        let ports = file.ports.unwrap_or_default();
        let ports = Ports {
            pd: ports.pd_port.unwrap_or(default_ports.pd),
            pd_peer: ports.pd_peer_port.unwrap_or(default_ports.pd_peer),
            tikv_addr: ports.tikv_addr_port.unwrap_or(default_ports.tikv_addr),
            tikv_status: ports.tikv_status_port.unwrap_or(default_ports.tikv_status),
        };

        let ssh = file.ssh.unwrap_or_default();
        let ssh = SshSettings {
            user,
            port: ssh.port.unwrap_or(DEFAULT_SSH_PORT),
            identity: ssh.identity.map(PathBuf::from),
        };

        let default_timing = Timing::default();
        let timing = file.timing.unwrap_or_default();
        let timing = Timing {
            settle: secs_or(timing.settle_secs, default_timing.settle),
            coordinator: secs_or(timing.coordinator_secs, default_timing.coordinator),
            storage_node: secs_or(timing.storage_node_secs, default_timing.storage_node),
            storage: secs_or(timing.storage_secs, default_timing.storage),
            trace: secs_or(timing.trace_secs, default_timing.trace),
            teardown: secs_or(timing.teardown_secs, default_timing.teardown),
        };

        let readiness = file.readiness.unwrap_or_default();
        let probe_interval_ms = readiness
            .probe_interval_ms
            .unwrap_or(DEFAULT_PROBE_INTERVAL_MS);
        if probe_interval_ms == 0 {
            return Err(ConfigError::FieldMustBePositive {
                field: "readiness.probe_interval_ms",
            });
        }
        let readiness = ReadinessSettings {
            mode: readiness.mode.unwrap_or_default(),
            probe_interval: Duration::from_millis(probe_interval_ms),
            probe_timeout: Duration::from_secs(
                readiness
                    .probe_timeout_secs
                    .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
            ),
        };

        let storage = file.storage.unwrap_or_default();
        let blktrace_files = storage.blktrace_files.unwrap_or(DEFAULT_BLKTRACE_FILES);
        if blktrace_files == 0 {
            return Err(ConfigError::FieldMustBePositive {
                field: "storage.blktrace_files",
            });
        }
        let storage = StorageSettings {
            memory_max: storage
                .memory_max
                .unwrap_or_else(|| DEFAULT_MEMORY_MAX.to_owned()),
            block_device: storage
                .block_device
                .unwrap_or_else(|| DEFAULT_BLOCK_DEVICE.to_owned()),
            blktrace_files,
        };

        Ok(Self {
            paths,
            ports,
            ssh,
            timing,
            readiness,
            storage,
        })
    }
}

fn secs_or(value: Option<u64>, default: Duration) -> Duration {
    value.map_or(default, Duration::from_secs)
}

fn local_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "root".to_owned())
}

fn default_home(user: &str) -> String {
    if let Ok(home) = std::env::var("HOME") {
        return home;
    }
    if user == "root" {
        return "/root".to_owned();
    }
    format!("/home/{}", user)
}
