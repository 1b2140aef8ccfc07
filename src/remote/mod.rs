//! Remote execution: connections, the service registry and lifecycle, and
//! parallel job dispatch.
mod connection;
mod dispatch;
mod lifecycle;
mod recording;
mod registry;
mod role;
mod ssh;


pub use connection::{CommandOutput, Connection, detached, redirected, run_checked};
pub use dispatch::{Dispatcher, Job, JobOutcome, OutputSpec};
pub use lifecycle::{RoleArtifacts, ServiceLifecycle};
pub use recording::RecordingConnection;
pub use registry::{RoleGroup, ServiceHandle, ServiceRegistry};
pub use role::{Role, split_service_name};
pub use ssh::SshConnection;
