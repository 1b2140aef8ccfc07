//! Core library for the `kvsweep` CLI.
//!
//! This crate provides the building blocks used by the binary: remote
//! service lifecycle and parallel dispatch over SSH, the experiment sweep
//! controller, and histogram analysis of storage node metrics exports. The
//! primary user-facing interface is the `kvsweep` command-line application;
//! library APIs may evolve as the CLI grows.
pub mod analysis;
pub mod args;
pub mod charts;
pub mod config;
pub mod entry;
pub mod error;
pub mod experiment;
pub mod remote;
pub mod system;
