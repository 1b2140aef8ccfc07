//! Shell command lines for every remote step of an experiment.
use crate::config::Settings;

use super::params::ExperimentParameters;

/// Flushes the page cache so a sweep point starts cold.
pub const DROP_CACHES: &str = "echo 3 | sudo tee /proc/sys/vm/drop_caches";

/// Lists storage server processes: the scope wrapper first, then the server.
pub const SERVER_PID_PROBE: &str = "pgrep -f tikv-server";

/// Coordinator launcher log, relative to the remote home.
pub const COORDINATOR_LAUNCH_LOG: &str = "runpd.log";

/// Renders `exe --key="value" ...`.
#[must_use]
pub fn build_cmd(exe: &str, options: &[(&str, String)]) -> String {
    let mut parts = Vec::with_capacity(options.len().saturating_add(1));
    parts.push(exe.to_owned());
    parts.extend(
        options
            .iter()
            .map(|(key, value)| format!("--{}=\"{}\"", key, value)),
    );
    parts.join(" ")
}

#[must_use]
pub fn coordinator_command(params: &ExperimentParameters, settings: &Settings) -> String {
    let node = &params.coordinator_node;
    let options = [
        ("name", "pd".to_owned()),
        ("data-dir", settings.paths.in_data("pd")),
        ("client-urls", format!("http://{}:{}", node, settings.ports.pd)),
        ("peer-urls", format!("http://{}:{}", node, settings.ports.pd_peer)),
        ("log-file", settings.paths.in_home("pd.log")),
    ];
    build_cmd(&settings.paths.pd_exe(), &options)
}

/// Storage server on `host`, wrapped in a memory-capped systemd scope.
#[must_use]
pub fn storage_command(params: &ExperimentParameters, settings: &Settings, host: &str) -> String {
    let exe = format!(
        "sudo systemd-run --scope -p MemoryMax={} --setenv=RUST_BACKTRACE=1 {}",
        settings.storage.memory_max,
        settings.paths.tikv_exe()
    );
    let options = [
        (
            "pd-endpoints",
            format!("{}:{}", params.coordinator_node, settings.ports.pd),
        ),
        ("addr", format!("{}:{}", host, settings.ports.tikv_addr)),
        ("status-addr", format!("{}:{}", host, settings.ports.tikv_status)),
        ("data-dir", settings.paths.in_data("tikv-data")),
        ("log-file", settings.paths.in_home("tikv.log")),
    ];
    build_cmd(&exe, &options)
}

#[must_use]
pub fn storage_launch_log(index: usize) -> String {
    format!("run-tikv-{}.log", index)
}

/// Load generator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YcsbPhase {
    Load,
    Run,
}

impl YcsbPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            YcsbPhase::Load => "load",
            YcsbPhase::Run => "run",
        }
    }
}

/// `go-ycsb {phase} tikv -P {workload file} -p key=value ...`
#[must_use]
pub fn ycsb_command(
    settings: &Settings,
    phase: YcsbPhase,
    workload: char,
    properties: &[String],
) -> String {
    let mut parts = vec![
        settings.paths.ycsb_exe(),
        phase.as_str().to_owned(),
        "tikv".to_owned(),
        "-P".to_owned(),
        format!("{}{}", settings.paths.workload_prefix(), workload),
    ];
    for property in properties {
        parts.push("-p".to_owned());
        parts.push(property.clone());
    }
    parts.join(" ")
}

/// Traces file, write and fsync syscalls of `server_pid` inside its namespaces.
#[must_use]
pub fn strace_command(trace_file: &str, server_pid: &str) -> String {
    format!(
        "sudo nsenter -t {pid} -p -n -u -i -C strace -r -e trace=%file,write,fsync -o {file} -fp {pid}",
        pid = server_pid,
        file = trace_file
    )
}

#[must_use]
pub fn blktrace_command(block_device: &str) -> String {
    format!("sudo blktrace -d /dev/{}", block_device)
}

/// Picks the storage server pid out of [`SERVER_PID_PROBE`] output.
///
/// The first line is the scope wrapper; a lone line is taken as the server.
#[must_use]
pub fn server_pid(probe_stdout: &str) -> Option<&str> {
    let mut lines = probe_stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());
    let first = lines.next()?;
    Some(lines.next().unwrap_or(first))
}

#[must_use]
pub fn load_output_base(client_threads: u64) -> String {
    format!("load_threads_{}_client", client_threads)
}

#[must_use]
pub fn run_output_base(workload: char, client_threads: u64) -> String {
    format!("run_{}_threads_{}_client", workload, client_threads)
}
