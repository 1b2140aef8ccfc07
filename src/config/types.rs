use serde::Deserialize;

/// On-disk deployment config. Every section and field is optional; missing
/// values fall back to the defaults in [`super::Settings`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub ports: Option<PortsConfig>,
    pub ssh: Option<SshConfig>,
    pub timing: Option<TimingConfig>,
    pub readiness: Option<ReadinessConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub home: Option<String>,
    pub exe: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortsConfig {
    pub pd_port: Option<u16>,
    pub pd_peer_port: Option<u16>,
    pub tikv_addr_port: Option<u16>,
    pub tikv_status_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SshConfig {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity: Option<String>,
}

/// Fixed pauses, in seconds.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    pub settle_secs: Option<u64>,
    pub coordinator_secs: Option<u64>,
    pub storage_node_secs: Option<u64>,
    pub storage_secs: Option<u64>,
    pub trace_secs: Option<u64>,
    pub teardown_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessMode {
    #[default]
    Fixed,
    Probe,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessConfig {
    pub mode: Option<ReadinessMode>,
    pub probe_interval_ms: Option<u64>,
    pub probe_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub memory_max: Option<String>,
    pub block_device: Option<String>,
    pub blktrace_files: Option<usize>,
}
