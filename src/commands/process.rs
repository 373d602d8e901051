//! Process command implementation.
//!
//! Prints the metrics of a single process.

use anyhow::{bail, Context};
use herakles_proc_sampler::fmt::{format_decimal, format_duration, format_percent};
use herakles_proc_sampler::{Pid, ProcessMetrics, ProcessSampler, SamplerConfig};

use super::emit;
use crate::cli::OutputFormat;

pub fn command_process(config: &SamplerConfig, pid: &str, format: OutputFormat) -> anyhow::Result<()> {
    let pid: Pid = pid.parse()?;
    let sampler = ProcessSampler::new(config);

    let metrics = match sampler
        .sample(&pid)
        .with_context(|| format!("Failed to sample pid {}", pid))?
    {
        Some(m) => m,
        None => bail!("Process {} does not exist (or exited while sampling)", pid),
    };

    emit(format, metrics, print_process)
}

pub(crate) fn print_process(m: &ProcessMetrics) {
    println!("PID:        {}", m.pid);
    println!("User:       {}", m.user);
    println!("Command:    {}", m.command);
    println!("VmSize:     {} MB", format_decimal(m.vm_size_mb));
    println!("Started:    {}s after boot", format_decimal(m.start_time_seconds));
    println!("Running:    {}", format_duration(m.elapsed_seconds));
    println!("CPU:        {}%", format_percent(m.cpu_percent));
}
