use std::collections::BTreeMap;
use std::sync::Arc;

use super::connection::Connection;

/// A detached remote process launched under a unique service name.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    name: String,
    pid: String,
    connection: Arc<dyn Connection>,
}

impl ServiceHandle {
    #[must_use]
    pub fn new(name: &str, pid: &str, connection: Arc<dyn Connection>) -> Self {
        Self {
            name: name.to_owned(),
            pid: pid.to_owned(),
            connection,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pid reported by the launching shell (possibly a wrapper process).
    #[must_use]
    pub fn pid(&self) -> &str {
        &self.pid
    }

    #[must_use]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

/// Session-owned map of service name to handle.
///
/// Launching under an existing name replaces the old handle. Termination and
/// cleanup only read the registry; the owner decides when a sweep point's
/// handles are retired with [`ServiceRegistry::clear`].
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceHandle>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `handle`, returning the handle it replaced, if any.
    pub fn register(&mut self, handle: ServiceHandle) -> Option<ServiceHandle> {
        self.services.insert(handle.name.clone(), handle)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServiceHandle> {
        self.services.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Handles in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceHandle> {
        self.services.values()
    }

    /// Every handle whose name starts with `prefix`.
    #[must_use]
    pub fn role_group(&self, prefix: &str) -> RoleGroup<'_> {
        let members = self
            .services
            .values()
            .filter(|handle| handle.name.starts_with(prefix))
            .collect();
        RoleGroup { members }
    }

    pub fn clear(&mut self) {
        self.services.clear();
    }
}

/// The set of registered instances of one role, selected by name prefix.
#[derive(Debug)]
pub struct RoleGroup<'reg> {
    members: Vec<&'reg ServiceHandle>,
}

impl<'reg> RoleGroup<'reg> {
    #[must_use]
    pub fn members(&self) -> &[&'reg ServiceHandle] {
        &self.members
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
