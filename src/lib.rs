//! Herakles Process Sampler Library
//!
//! Point-in-time Linux system and process metrics read from procfs. The
//! library is split into a snapshot reader, which turns kernel text sources
//! into tokenized field sequences, and metric calculations, which are pure
//! functions over one or two of those snapshots.
//!
//! # Features
//!
//! - **Process Discovery**: Enumerate numeric entries of the process root
//! - **Per-Process Metrics**: Virtual size, owning user, start/elapsed time, CPU average
//! - **System Metrics**: Uptime, cores, kernel/OS identification, process and thread counts
//! - **Two-Sample CPU Rate**: Utilisation between two caller-held samples
//! - **No Hidden State**: Every call is a fresh read over explicit configuration
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_proc_sampler::{cpu_percent_between, SamplerConfig, SystemSampler};
//! use std::{thread, time::Duration};
//!
//! let config = SamplerConfig::default();
//! let system = SystemSampler::new(&config);
//!
//! // The caller owns timing and keeps the earlier sample
//! let earlier = system.cpu_sample(None)?.expect("aggregate cpu line");
//! thread::sleep(Duration::from_millis(config.interval_ms));
//! let later = system.cpu_sample(None)?.expect("aggregate cpu line");
//!
//! match cpu_percent_between(&earlier, &later) {
//!     Some(pct) => println!("CPU busy: {:.1}%", pct),
//!     None => println!("CPU busy: n/a (no ticks elapsed)"),
//! }
//! println!("RAM used: {:?}", system.ram_percent()?);
//! # Ok::<(), herakles_proc_sampler::SamplerError>(())
//! ```

pub mod config;
pub mod error;
pub mod fmt;
pub mod metrics;
pub mod reader;
pub mod schema;

// Re-export main types for convenience
pub use config::{SamplerConfig, detect_clock_ticks};
pub use error::{Result, SamplerError};
pub use metrics::{
    cpu_percent_between, CpuSample, MemorySnapshot, ProcessMetrics, ProcessSampler,
    SystemSampler, SystemSummary,
};
pub use reader::{FieldSequence, Pid, SnapshotReader};
