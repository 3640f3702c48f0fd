//! Monitoring engine: probes, thresholds, and the fixed workload

pub mod engine;
pub mod thresholds;
pub mod workload;

pub use engine::{MonitoringEngine, ProbeError};
pub use thresholds::{SharedThresholds, Thresholds};
pub use workload::{workload, ProbeSpec};
