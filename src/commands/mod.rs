//! CLI command implementations for herakles-proc-sampler.
//!
//! This module provides implementations for all CLI subcommands:
//! - `system`: One-shot host summary
//! - `cpu`: Two-sample CPU utilisation
//! - `process`: Metrics of one process
//! - `list`: Metrics of every listed process
//! - `check`: procfs access and layout validation

pub mod check;
pub mod cpu;
pub mod list;
pub mod process;
pub mod system;

// Re-export command functions
pub use check::command_check;
pub use cpu::command_cpu;
pub use list::command_list;
pub use process::command_process;
pub use system::command_system;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Timestamped envelope for structured output.
#[derive(Debug, Serialize)]
pub struct Report<T: Serialize> {
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T: Serialize> Report<T> {
    pub fn now(data: T) -> Self {
        Self {
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Prints `data` as JSON/YAML, or through `text` for plain output.
pub fn emit<T, F>(format: OutputFormat, data: T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Text => text(&data),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&Report::now(data))?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&Report::now(data))?),
    }
    Ok(())
}
