//! List command implementation.
//!
//! Enumerates processes and prints their metrics, skipping any that exit
//! while the scan runs.

use anyhow::Context;
use herakles_proc_sampler::fmt::{format_decimal, format_duration, format_percent};
use herakles_proc_sampler::{ProcessMetrics, ProcessSampler, SamplerConfig};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::emit;
use crate::cli::OutputFormat;

pub fn command_list(
    config: &SamplerConfig,
    limit: Option<usize>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let sampler = ProcessSampler::new(config);
    let pids = sampler
        .reader()
        .list_pids()
        .context("Failed to enumerate processes")?;
    debug!("Found {} process entries", pids.len());

    let mut results: Vec<ProcessMetrics> = Vec::new();
    let mut vanished = 0usize;
    let mut errors = 0usize;

    for pid in &pids {
        if limit.is_some_and(|max| results.len() >= max) {
            break;
        }
        match sampler.sample(pid) {
            Ok(Some(m)) => results.push(m),
            Ok(None) => vanished += 1,
            Err(e) => {
                errors += 1;
                warn!("Skipping pid {}: {}", pid, e);
            }
        }
    }

    info!(
        "Sampled {} processes in {:.2}ms ({} vanished, {} errors)",
        results.len(),
        start.elapsed().as_secs_f64() * 1000.0,
        vanished,
        errors
    );

    emit(format, results, |rows| {
        println!(
            "{:>8}  {:<12} {:>12} {:>10} {:>12}  COMMAND",
            "PID", "USER", "VMSIZE(MB)", "CPU%", "TIME"
        );
        for m in rows {
            println!(
                "{:>8}  {:<12} {:>12} {:>10} {:>12}  {}",
                m.pid.as_str(),
                truncate(&m.user, 12),
                format_decimal(m.vm_size_mb),
                format_percent(m.cpu_percent),
                format_duration(m.elapsed_seconds),
                m.command
            );
        }
    })
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
