use std::time::Duration;

use tempfile::tempdir;

use super::*;
use crate::error::{AppError, ConfigError};

fn write_config(name: &str, content: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join(name);
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    Ok((dir, path))
}

#[test]
fn resolve_without_file_uses_defaults() -> Result<(), String> {
    let settings = Settings::resolve(None).map_err(|err| format!("resolve failed: {}", err))?;
    if settings.paths.exe != "/software" || settings.paths.data != "/mnt/data" {
        return Err(format!("Unexpected paths: {:?}", settings.paths));
    }
    if settings.ports != Ports::default() || settings.ports.tikv_status != 20180 {
        return Err(format!("Unexpected ports: {:?}", settings.ports));
    }
    if settings.timing.coordinator != Duration::from_secs(8)
        || settings.timing.storage_node != Duration::from_secs(3)
    {
        return Err(format!("Unexpected timing: {:?}", settings.timing));
    }
    if settings.readiness.mode != ReadinessMode::Fixed {
        return Err("Expected fixed readiness by default".to_owned());
    }
    if settings.storage.blktrace_files != 32 || settings.storage.memory_max != "32G" {
        return Err(format!("Unexpected storage: {:?}", settings.storage));
    }
    Ok(())
}

#[test]
fn derived_paths_follow_exe_root() -> Result<(), String> {
    let paths = RemotePaths {
        home: "/home/bench".to_owned(),
        exe: "/opt".to_owned(),
        data: "/data".to_owned(),
    };
    if paths.ycsb_exe() != "/opt/go-ycsb/bin/go-ycsb" {
        return Err(paths.ycsb_exe());
    }
    if paths.workload_prefix() != "/opt/go-ycsb/workloads/workload" {
        return Err(paths.workload_prefix());
    }
    if paths.tikv_exe() != "/opt/tikv-xll/target/release/tikv-server" {
        return Err(paths.tikv_exe());
    }
    if paths.pd_exe() != "/opt/pd/bin/pd-server" {
        return Err(paths.pd_exe());
    }
    if paths.in_home("pd.log") != "/home/bench/pd.log" || paths.in_data("pd") != "/data/pd" {
        return Err("Unexpected joined paths".to_owned());
    }
    Ok(())
}

#[test]
fn toml_config_overrides_sections() -> Result<(), String> {
    let (_dir, path) = write_config(
        "kvsweep.toml",
        r#"
[paths]
home = "/home/bench"

[ports]
tikv_status_port = 21180

[ssh]
user = "bench"
port = 2222

[timing]
settle_secs = 1
teardown_secs = 0

[readiness]
mode = "probe"
probe_interval_ms = 250

[storage]
block_device = "nvme0n1"
"#,
    )?;
    let file = load_config_file(&path).map_err(|err| format!("load failed: {}", err))?;
    let settings =
        Settings::resolve(Some(file)).map_err(|err| format!("resolve failed: {}", err))?;
    if settings.paths.home != "/home/bench" || settings.paths.exe != "/software" {
        return Err(format!("Unexpected paths: {:?}", settings.paths));
    }
    if settings.ports.tikv_status != 21180 || settings.ports.pd != 2379 {
        return Err(format!("Unexpected ports: {:?}", settings.ports));
    }
    if settings.ssh.user != "bench" || settings.ssh.port != 2222 {
        return Err(format!("Unexpected ssh: {:?}", settings.ssh));
    }
    if settings.timing.settle != Duration::from_secs(1)
        || settings.timing.teardown != Duration::ZERO
    {
        return Err(format!("Unexpected timing: {:?}", settings.timing));
    }
    if settings.readiness.mode != ReadinessMode::Probe
        || settings.readiness.probe_interval != Duration::from_millis(250)
    {
        return Err(format!("Unexpected readiness: {:?}", settings.readiness));
    }
    if settings.storage.block_device != "nvme0n1" {
        return Err(format!("Unexpected storage: {:?}", settings.storage));
    }
    Ok(())
}

#[test]
fn json_config_is_supported() -> Result<(), String> {
    let (_dir, path) = write_config("kvsweep.json", r#"{"ports": {"pd_port": 3379}}"#)?;
    let file = load_config_file(&path).map_err(|err| format!("load failed: {}", err))?;
    let settings =
        Settings::resolve(Some(file)).map_err(|err| format!("resolve failed: {}", err))?;
    if settings.ports.pd != 3379 {
        return Err(format!("Unexpected pd port: {}", settings.ports.pd));
    }
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() -> Result<(), String> {
    let (_dir, path) = write_config("kvsweep.yaml", "ports: {}")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn unknown_fields_are_rejected() -> Result<(), String> {
    let (_dir, path) = write_config("kvsweep.toml", "[ports]\nrpc_port = 1\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ParseToml { .. })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn zero_blktrace_files_is_rejected() -> Result<(), String> {
    let (_dir, path) = write_config("kvsweep.toml", "[storage]\nblktrace_files = 0\n")?;
    let file = load_config_file(&path).map_err(|err| format!("load failed: {}", err))?;
    match Settings::resolve(Some(file)) {
        Err(ConfigError::FieldMustBePositive { field }) if field == "storage.blktrace_files" => {
            Ok(())
        }
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}
