//! Metric calculations over snapshot reader output.
//!
//! This module provides:
//! - `cpu`: CPU bucket samples and the two-sample utilisation rate
//! - `memory`: RAM utilisation from meminfo
//! - `process`: per-process size, user, timing and CPU estimate
//! - `system`: host-wide counters, identification and thread totals

pub mod cpu;
pub mod memory;
pub mod process;
pub mod system;

// Re-export commonly used types
pub use cpu::{cpu_percent_between, CpuSample};
pub use memory::MemorySnapshot;
pub use process::{ProcessMetrics, ProcessSampler};
pub use system::{SystemSampler, SystemSummary};
