use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;

use crate::error::ValidationError;

/// Which experiment skeleton the sweep controller drives.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentType {
    /// Fresh cluster per thread count, load phase only.
    #[value(name = "writescalability", alias = "write-scalability")]
    WriteScalability,
    /// One cluster, load then the workload list.
    #[value(name = "ycsb")]
    Ycsb,
    /// One cluster with syscall and block-layer tracing on every storage node.
    #[value(name = "disk_measurement", alias = "disk-measurement")]
    DiskMeasurement,
}

impl ExperimentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ExperimentType::WriteScalability => "writescalability",
            ExperimentType::Ycsb => "ycsb",
            ExperimentType::DiskMeasurement => "disk_measurement",
        }
    }
}

/// Comma-separated host list as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeList(Vec<String>);

impl NodeList {
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_hosts(self) -> Vec<String> {
        self.0
    }
}

impl std::str::FromStr for NodeList {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyNodeList);
        }
        let mut hosts = Vec::new();
        for entry in s.split(',') {
            let host = entry.trim();
            if host.is_empty() {
                return Err(ValidationError::EmptyNodeEntry {
                    value: s.to_owned(),
                });
            }
            hosts.push(host.to_owned());
        }
        Ok(NodeList(hosts))
    }
}

/// Workload letters (`a`..`z`) passed to the load generator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkloadList(Vec<char>);

impl WorkloadList {
    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.0
    }
}

impl std::str::FromStr for WorkloadList {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut letters = Vec::new();
        for entry in s.split(',') {
            let trimmed = entry.trim();
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_lowercase() => letters.push(letter),
                _ => {
                    return Err(ValidationError::InvalidWorkload {
                        value: trimmed.to_owned(),
                    });
                }
            }
        }
        Ok(WorkloadList(letters))
    }
}

/// One `LABEL=PATH` pair naming an experiment's metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentSpec {
    pub label: String,
    pub metrics_path: PathBuf,
}

impl std::str::FromStr for ExperimentSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((label, path)) = s.split_once('=') else {
            return Err(ValidationError::InvalidExperimentSpec {
                value: s.to_owned(),
            });
        };
        let label = label.trim();
        let path = path.trim();
        if label.is_empty() || path.is_empty() {
            return Err(ValidationError::InvalidExperimentSpec {
                value: s.to_owned(),
            });
        }
        if label.contains('/') {
            return Err(ValidationError::InvalidLabel {
                value: label.to_owned(),
                separator: '/',
            });
        }
        Ok(ExperimentSpec {
            label: label.to_owned(),
            metrics_path: PathBuf::from(path),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveU64::try_from(value)
    }
}

impl From<PositiveU64> for u64 {
    fn from(value: PositiveU64) -> Self {
        value.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

impl From<PositiveUsize> for usize {
    fn from(value: PositiveUsize) -> Self {
        value.get()
    }
}
