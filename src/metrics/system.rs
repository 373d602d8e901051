//! System-wide metrics collection from /proc filesystem.
//!
//! This module provides uptime, core count, kernel and OS identification,
//! process counters, thread totals and CPU samples. Each call performs a
//! fresh read.

use ahash::AHashMap as HashMap;
use serde::Serialize;
use tracing::debug;

use crate::config::SamplerConfig;
use crate::error::Result;
use crate::metrics::cpu::CpuSample;
use crate::metrics::memory::MemorySnapshot;
use crate::metrics::process::ProcessSampler;
use crate::reader::{FieldSequence, SnapshotReader};
use crate::schema::{CPUINFO_CORES, KERNEL_VERSION, KEYED_VALUE, UPTIME_SECONDS};

const UPTIME: &str = "/proc/uptime";
const STAT: &str = "/proc/stat";
const CPUINFO: &str = "/proc/cpuinfo";

/// Seconds since boot with the fractional part kept.
pub fn read_uptime(reader: &SnapshotReader) -> Result<f64> {
    reader
        .read_first_line(&reader.uptime_path())?
        .parse_at::<f64>(UPTIME, UPTIME_SECONDS)
}

/// One-shot view of the host, assembled from independent reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    pub os_name: String,
    pub kernel_version: String,
    pub cores: u32,
    pub uptime_seconds: u64,
    /// `None` when meminfo reports total equal to buffers.
    pub ram_percent: Option<f64>,
    pub total_processes: u64,
    pub running_processes: u64,
    pub total_threads: u64,
}

/// Reads system-wide sources.
#[derive(Debug, Clone)]
pub struct SystemSampler {
    reader: SnapshotReader,
    processes: ProcessSampler,
}

impl SystemSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            reader: SnapshotReader::new(config),
            processes: ProcessSampler::new(config),
        }
    }

    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// Seconds since boot, truncated.
    pub fn uptime_seconds(&self) -> Result<u64> {
        Ok(read_uptime(&self.reader)? as u64)
    }

    /// Physical cores per package from cpuinfo's `cpu cores` line; 0 if absent.
    pub fn core_count(&self) -> Result<u32> {
        let line = self
            .reader
            .read_first_matching_line(&self.reader.cpuinfo_path(), "cpu cores")?;
        optional_value(&line, CPUINFO, CPUINFO_CORES)
    }

    /// Release string from the `Linux version ` banner; empty if absent.
    pub fn kernel_version(&self) -> Result<String> {
        let line = self
            .reader
            .read_first_matching_line(&self.reader.version_path(), "Linux version ")?;
        Ok(line.get(KERNEL_VERSION).unwrap_or_default().to_string())
    }

    /// `PRETTY_NAME` from os-release with quotes removed; empty if absent.
    pub fn os_name(&self) -> Result<String> {
        let line = self
            .reader
            .find_line(self.reader.os_release_path(), "PRETTY_NAME=")?;
        Ok(line.as_deref().map(pretty_name_value).unwrap_or_default())
    }

    /// Forks since boot (`processes` line of /proc/stat).
    pub fn total_processes(&self) -> Result<u64> {
        let line = self
            .reader
            .read_first_matching_line(&self.reader.stat_path(), "processes")?;
        optional_value(&line, STAT, KEYED_VALUE)
    }

    /// Runnable processes right now (`procs_running` line of /proc/stat).
    pub fn running_processes(&self) -> Result<u64> {
        let line = self
            .reader
            .read_first_matching_line(&self.reader.stat_path(), "procs_running")?;
        optional_value(&line, STAT, KEYED_VALUE)
    }

    /// Sum of `Threads:` over every process currently listed.
    ///
    /// Processes that vanish or have unreadable or malformed status files
    /// are skipped; only failing to list the root is an error.
    pub fn total_threads(&self) -> Result<u64> {
        let pids = self.reader.list_pids()?;
        let mut total = 0u64;
        let mut skipped = 0usize;
        for pid in &pids {
            match self.processes.threads(pid) {
                Ok(Some(n)) => total += n,
                Ok(None) => {
                    skipped += 1;
                    debug!("pid {} has no Threads line, skipping", pid);
                }
                Err(e) => {
                    skipped += 1;
                    debug!("Skipping pid {} for thread total: {}", pid, e);
                }
            }
        }
        debug!(
            "Counted {} threads across {} processes ({} skipped)",
            total,
            pids.len() - skipped,
            skipped
        );
        Ok(total)
    }

    /// RAM utilisation percent from one meminfo pass.
    pub fn ram_percent(&self) -> Result<Option<f64>> {
        Ok(MemorySnapshot::read(&self.reader)?.ram_percent())
    }

    /// CPU buckets for the aggregate line, or for core `n`.
    ///
    /// Returns `None` when the requested line does not exist.
    pub fn cpu_sample(&self, core: Option<u32>) -> Result<Option<CpuSample>> {
        // Trailing space keeps "cpu1" from matching "cpu10"
        let key = match core {
            Some(n) => format!("cpu{} ", n),
            None => "cpu ".to_string(),
        };
        let line = self
            .reader
            .read_first_matching_line(&self.reader.stat_path(), &key)?;
        if line.is_empty() {
            return Ok(None);
        }
        CpuSample::from_fields(&line).map(Some)
    }

    /// Every `cpu`/`cpuN` line keyed by its label, from one pass over stat.
    ///
    /// Offline cores are absent from the file, so numbering may have gaps.
    pub fn cpu_samples(&self) -> Result<HashMap<String, CpuSample>> {
        let lines = self
            .reader
            .read_lines_with_prefix(&self.reader.stat_path(), "cpu")?;
        let mut samples = HashMap::new();
        for line in &lines {
            let Some(label) = line.get(0).filter(|l| is_cpu_label(l)) else {
                continue;
            };
            samples.insert(label.to_string(), CpuSample::from_fields(line)?);
        }
        Ok(samples)
    }

    /// Collects every system-wide metric into one summary.
    pub fn summary(&self) -> Result<SystemSummary> {
        Ok(SystemSummary {
            os_name: self.os_name()?,
            kernel_version: self.kernel_version()?,
            cores: self.core_count()?,
            uptime_seconds: self.uptime_seconds()?,
            ram_percent: self.ram_percent()?,
            total_processes: self.total_processes()?,
            running_processes: self.running_processes()?,
            total_threads: self.total_threads()?,
        })
    }
}

/// Value of a `KEY=value` line with every double quote removed.
pub fn pretty_name_value(line: &str) -> String {
    let value = match line.split_once('=') {
        Some((_, v)) => v,
        None => "",
    };
    value.chars().filter(|&c| c != '"').collect()
}

/// `cpu` or `cpu` followed only by digits.
fn is_cpu_label(label: &str) -> bool {
    label
        .strip_prefix("cpu")
        .is_some_and(|n| n.bytes().all(|b| b.is_ascii_digit()))
}

fn optional_value<T>(line: &FieldSequence, source: &'static str, index: usize) -> Result<T>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    if line.is_empty() {
        return Ok(T::default());
    }
    line.parse_at(source, index)
}
