use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::RemoteError;

use super::connection::{Connection, detached, run_checked};
use super::registry::{ServiceHandle, ServiceRegistry};
use super::role::{Role, split_service_name};

/// Remote paths each role leaves behind, removed by cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleArtifacts {
    paths: BTreeMap<Role, Vec<String>>,
}

impl RoleArtifacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, role: Role, paths: Vec<String>) -> Self {
        self.paths.insert(role, paths);
        self
    }

    #[must_use]
    pub fn paths(&self, role: Role) -> &[String] {
        self.paths.get(&role).map_or(&[], Vec::as_slice)
    }
}

/// Starts, stops and cleans up after registered services.
///
/// Stop and cleanup are best effort: every failure is logged and the
/// remaining instances are still processed, so teardown of a half-started
/// cluster always runs to the end.
#[derive(Debug, Clone, Default)]
pub struct ServiceLifecycle {
    artifacts: RoleArtifacts,
}

impl ServiceLifecycle {
    #[must_use]
    pub const fn new(artifacts: RoleArtifacts) -> Self {
        Self { artifacts }
    }

    /// Starts `command` detached on `connection` and records it under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the launch command fails or prints no pid.
    pub async fn launch(
        &self,
        registry: &mut ServiceRegistry,
        connection: &Arc<dyn Connection>,
        command: &str,
        name: &str,
        log_file: &str,
    ) -> Result<ServiceHandle, RemoteError> {
        info!("Starting {} on {}", name, connection.host());
        let output = run_checked(connection.as_ref(), &detached(command, log_file)).await?;

        let pid = output
            .stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty() && line.bytes().all(|byte| byte.is_ascii_digit()))
            .ok_or_else(|| RemoteError::MissingPid {
                host: connection.host().to_owned(),
                name: name.to_owned(),
                stdout: output.stdout.trim().to_owned(),
            })?;

        let handle = ServiceHandle::new(name, pid, Arc::clone(connection));
        if registry.register(handle.clone()).is_some() {
            debug!("Replaced earlier registration of {}", name);
        }
        info!("{} running on {} with pid {}", name, connection.host(), pid);
        Ok(handle)
    }

    /// Force-kills every registered instance whose name starts with `prefix`.
    ///
    /// Returns the number of instances a kill was sent for.
    pub async fn terminate(&self, registry: &ServiceRegistry, prefix: &str) -> usize {
        let group = registry.role_group(prefix);
        if group.is_empty() {
            debug!("No '{}' services registered, nothing to stop", prefix);
            return 0;
        }

        let pattern = Role::from_prefix(prefix).map_or(prefix, |role| role.process_name());
        let command = format!("sudo pkill -9 {}", pattern);
        for handle in group.members() {
            let host = handle.connection().host();
            match handle.connection().run(&command).await {
                Ok(output) if output.success() => info!("Stopped {} on {}", handle.name(), host),
                Ok(output) => warn!(
                    "Stopping {} on {} returned {}; it may have exited already",
                    handle.name(),
                    host,
                    output.status_label()
                ),
                Err(err) => warn!("Failed to stop {} on {}: {}", handle.name(), host, err),
            }
        }
        group.members().len()
    }

    /// Stops every role in teardown order.
    pub async fn terminate_all(&self, registry: &ServiceRegistry) {
        for role in Role::TEARDOWN_ORDER {
            self.terminate(registry, role.prefix()).await;
        }
    }

    /// Removes the remote artifacts of every instance matching `prefix`.
    ///
    /// Instances whose name does not map to a known role are skipped with a
    /// warning. Returns the number of removal commands issued.
    pub async fn cleanup(&self, registry: &ServiceRegistry, prefix: &str) -> usize {
        let mut issued = 0_usize;
        for handle in registry.role_group(prefix).members() {
            let role = split_service_name(handle.name())
                .and_then(|(role_prefix, _)| Role::from_prefix(role_prefix));
            let Some(role) = role else {
                warn!("Don't know how to clean up '{}', skipping", handle.name());
                continue;
            };

            let host = handle.connection().host();
            for path in self.artifacts.paths(role) {
                let command = format!("sudo rm -rf {}", path);
                issued = issued.saturating_add(1);
                match handle.connection().run(&command).await {
                    Ok(output) if output.success() => {
                        debug!("Removed {} on {}", path, host);
                    }
                    Ok(output) => warn!(
                        "Removing {} on {} returned {}",
                        path,
                        host,
                        output.status_label()
                    ),
                    Err(err) => warn!("Failed to remove {} on {}: {}", path, host, err),
                }
            }
        }
        issued
    }

    /// Cleans up after every registered instance.
    pub async fn cleanup_all(&self, registry: &ServiceRegistry) -> usize {
        self.cleanup(registry, "").await
    }
}
