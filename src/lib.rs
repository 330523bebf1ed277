//! sriov-vfstats — per-VF statistics for SR-IOV network devices.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod model;
pub mod collectors;
pub mod vfstats;
pub mod devices;
pub mod cycle;
pub mod config;
pub mod error;
