//! System command implementation.
//!
//! Prints a one-shot summary of the host.

use anyhow::Context;
use herakles_proc_sampler::fmt::{format_duration, format_percent};
use herakles_proc_sampler::{SamplerConfig, SystemSampler};
use tracing::debug;

use super::emit;
use crate::cli::OutputFormat;

pub fn command_system(config: &SamplerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let sampler = SystemSampler::new(config);
    let summary = sampler
        .summary()
        .context("Failed to collect system summary")?;
    debug!("Collected system summary: {:?}", summary);

    emit(format, summary, |s| {
        println!("OS:                {}", s.os_name);
        println!("Kernel:            {}", s.kernel_version);
        println!("Cores:             {}", s.cores);
        println!(
            "Uptime:            {} ({}s)",
            format_duration(s.uptime_seconds as f64),
            s.uptime_seconds
        );
        println!("RAM used:          {}%", format_percent(s.ram_percent));
        println!("Total processes:   {}", s.total_processes);
        println!("Running processes: {}", s.running_processes);
        println!("Total threads:     {}", s.total_threads);
    })
}
