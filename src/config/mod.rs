//! Deployment configuration loading and resolution.
mod loader;
mod settings;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::load_config;
pub use settings::{
    Ports, ReadinessSettings, RemotePaths, Settings, SshSettings, StorageSettings, Timing,
};
pub use types::ReadinessMode;

#[cfg(test)]
pub(crate) use loader::load_config_file;
