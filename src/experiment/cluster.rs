use std::sync::Arc;

use crate::config::SshSettings;
use crate::remote::{Connection, RecordingConnection, SshConnection};

use super::params::ExperimentParameters;

/// Connections to every node taking part in one run, grouped by role.
///
/// Storage and client connections keep the order of the node lists, so a
/// connection's position is its node index.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub coordinator: Arc<dyn Connection>,
    pub storage: Vec<Arc<dyn Connection>>,
    pub clients: Vec<Arc<dyn Connection>>,
}

impl Cluster {
    /// Opens SSH connections to the nodes named in `params`.
    #[must_use]
    pub fn connect(params: &ExperimentParameters, ssh: &SshSettings) -> Self {
        Self::with_connector(params, |host| {
            Arc::new(SshConnection::new(host, ssh)) as Arc<dyn Connection>
        })
    }

    /// Recording connections for `--dry-run`.
    #[must_use]
    pub fn dry_run(params: &ExperimentParameters) -> Self {
        Self::with_connector(params, |host| {
            Arc::new(RecordingConnection::new(host)) as Arc<dyn Connection>
        })
    }

    #[must_use]
    pub fn with_connector<F>(params: &ExperimentParameters, mut connect: F) -> Self
    where
        F: FnMut(&str) -> Arc<dyn Connection>,
    {
        let coordinator = connect(&params.coordinator_node);
        let storage = params
            .storage_nodes
            .iter()
            .map(|host| connect(host))
            .collect();
        let clients = params
            .client_nodes
            .iter()
            .map(|host| connect(host))
            .collect();
        Self {
            coordinator,
            storage,
            clients,
        }
    }
}
