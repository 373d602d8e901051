//! CPU command implementation.
//!
//! This is the caller side of the two-sample rate: it owns the interval and
//! keeps the previous sample between iterations.

use anyhow::{anyhow, Context};
use herakles_proc_sampler::fmt::format_percent;
use herakles_proc_sampler::{cpu_percent_between, CpuSample, SamplerConfig, SystemSampler};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::debug;

use super::emit;
use crate::cli::OutputFormat;

/// One computed rate for one scope.
#[derive(Debug, Serialize)]
struct CpuRate {
    scope: String,
    interval_ms: u64,
    cpu_percent: Option<f64>,
}

pub fn command_cpu(
    config: &SamplerConfig,
    core: Option<u32>,
    count: usize,
    all_cores: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let sampler = SystemSampler::new(config);
    let interval = Duration::from_millis(config.interval_ms);

    if all_cores {
        return sample_all_cores(&sampler, interval, config.interval_ms, count, format);
    }

    let scope = match core {
        Some(n) => format!("cpu{}", n),
        None => "cpu".to_string(),
    };
    let read = || -> anyhow::Result<CpuSample> {
        sampler
            .cpu_sample(core)
            .with_context(|| format!("Failed to read {} sample", scope))?
            .ok_or_else(|| anyhow!("No '{}' line in {}", scope, sampler.reader().stat_path().display()))
    };

    let mut previous = read()?;
    for iteration in 0..count {
        thread::sleep(interval);
        let current = read()?;
        let rate = CpuRate {
            scope: scope.clone(),
            interval_ms: config.interval_ms,
            cpu_percent: cpu_percent_between(&previous, &current),
        };
        debug!("Iteration {}: {:?}", iteration + 1, rate);
        emit(format, rate, |r| {
            println!("{:<6} {}%", r.scope, format_percent(r.cpu_percent))
        })?;
        previous = current;
    }
    Ok(())
}

fn sample_all_cores(
    sampler: &SystemSampler,
    interval: Duration,
    interval_ms: u64,
    count: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut previous = sampler.cpu_samples().context("Failed to read CPU samples")?;
    for _ in 0..count {
        thread::sleep(interval);
        let current = sampler.cpu_samples().context("Failed to read CPU samples")?;

        let mut rates: Vec<CpuRate> = current
            .iter()
            .filter_map(|(scope, later)| {
                // Cores that went offline mid-interval have no earlier sample
                previous.get(scope).map(|earlier| CpuRate {
                    scope: scope.clone(),
                    interval_ms,
                    cpu_percent: cpu_percent_between(earlier, later),
                })
            })
            .collect();
        rates.sort_by_key(|r| core_order(&r.scope));

        emit(format, rates, |rates| {
            for r in rates {
                println!("{:<6} {}%", r.scope, format_percent(r.cpu_percent));
            }
            println!();
        })?;
        previous = current;
    }
    Ok(())
}

/// Aggregate first, then cores numerically.
fn core_order(scope: &str) -> (u8, u32) {
    match scope.strip_prefix("cpu").and_then(|n| n.parse::<u32>().ok()) {
        Some(n) => (1, n),
        None => (0, 0),
    }
}
