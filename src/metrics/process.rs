//! Per-process metrics from `/proc/<pid>/{stat,status,cmdline}`.
//!
//! The CPU figure here is a single-sample estimate: total CPU time divided
//! by the wall-clock time the process has existed. Callers that need an
//! instantaneous per-process rate sample twice and take their own delta.

use crate::config::SamplerConfig;
use crate::error::Result;
use crate::metrics::system::read_uptime;
use crate::reader::{FieldSequence, Pid, SnapshotReader};
use crate::schema::{pid_stat, KEYED_VALUE};
use serde::Serialize;
use tracing::debug;

const STATUS: &str = "/proc/<pid>/status";

/// Derived values for one process at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMetrics {
    pub pid: Pid,
    pub command: String,
    pub user: String,
    pub vm_size_mb: f64,
    pub start_time_seconds: f64,
    pub elapsed_seconds: f64,
    /// `None` when the process has no measurable lifetime yet.
    pub cpu_percent: Option<f64>,
}

/// Virtual size in MB from the tokenized `VmSize:` status line.
///
/// Kernel threads have no `VmSize` line; an empty sequence yields 0.
pub fn vm_size_mb(vm_size_line: &FieldSequence) -> Result<f64> {
    if vm_size_line.is_empty() {
        return Ok(0.0);
    }
    let kb: f64 = vm_size_line.parse_at(STATUS, KEYED_VALUE)?;
    Ok(kb / 1024.0)
}

/// Seconds after boot at which the process started.
pub fn start_time_seconds(stat: &FieldSequence, ticks_per_second: f64) -> Result<f64> {
    pid_stat::SCHEMA.check(stat)?;
    let start_ticks: f64 = stat.parse_at(pid_stat::SCHEMA.name, pid_stat::STARTTIME)?;
    Ok(start_ticks / ticks_per_second)
}

/// Wall-clock seconds the process has existed.
pub fn elapsed_seconds(stat: &FieldSequence, uptime: f64, ticks_per_second: f64) -> Result<f64> {
    Ok(uptime - start_time_seconds(stat, ticks_per_second)?)
}

/// Average CPU utilisation since process start, children included.
///
/// `(utime + stime + cutime + cstime) / ticks` over the elapsed seconds,
/// times 100. Returns `None` when the elapsed time is not positive.
pub fn cpu_percent(stat: &FieldSequence, uptime: f64, ticks_per_second: f64) -> Result<Option<f64>> {
    pid_stat::SCHEMA.check(stat)?;
    let at = |idx| stat.parse_at::<f64>(pid_stat::SCHEMA.name, idx);
    let total_ticks =
        at(pid_stat::UTIME)? + at(pid_stat::STIME)? + at(pid_stat::CUTIME)? + at(pid_stat::CSTIME)?;

    let elapsed = elapsed_seconds(stat, uptime, ticks_per_second)?;
    if elapsed <= 0.0 || !elapsed.is_finite() {
        return Ok(None);
    }
    Ok(Some(100.0 * (total_ticks / ticks_per_second) / elapsed))
}

struct OwnSources {
    stat: FieldSequence,
    vm_size: FieldSequence,
    uid: Option<String>,
    command: String,
}

/// Reads per-process sources and applies the pure computations above.
#[derive(Debug, Clone)]
pub struct ProcessSampler {
    reader: SnapshotReader,
    ticks_per_second: f64,
}

impl ProcessSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            reader: SnapshotReader::new(config),
            ticks_per_second: config.clock_ticks_per_second(),
        }
    }

    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// All metrics for `pid`, or `None` if the process is gone.
    ///
    /// Only the process's own files count toward "gone": a missing pid
    /// directory, or a NotFound/ESRCH on its stat, status or cmdline.
    /// Failures of shared sources (uptime, the user database) are errors.
    pub fn sample(&self, pid: &Pid) -> Result<Option<ProcessMetrics>> {
        if !self.reader.pid_exists(pid) {
            debug!("pid {} vanished before sampling", pid);
            return Ok(None);
        }
        let own = match self.read_own_sources(pid) {
            Ok(own) => own,
            Err(e) if e.is_not_found() => {
                debug!("pid {} vanished during sampling: {}", pid, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let uptime = read_uptime(&self.reader)?;
        let user = match own.uid {
            Some(uid) => self.reader.resolve_user_name(&uid)?,
            None => String::new(),
        };
        Ok(Some(ProcessMetrics {
            pid: pid.clone(),
            command: own.command,
            user,
            vm_size_mb: vm_size_mb(&own.vm_size)?,
            start_time_seconds: start_time_seconds(&own.stat, self.ticks_per_second)?,
            elapsed_seconds: elapsed_seconds(&own.stat, uptime, self.ticks_per_second)?,
            cpu_percent: cpu_percent(&own.stat, uptime, self.ticks_per_second)?,
        }))
    }

    /// Reads everything under `/proc/<pid>` that `sample` needs.
    fn read_own_sources(&self, pid: &Pid) -> Result<OwnSources> {
        let stat = self.stat(pid)?;
        let status = self
            .reader
            .read_matching_lines(&self.reader.proc_path(pid, "status"), &["VmSize", "Uid:"])?;
        let mut status = status.into_iter();
        let vm_size = status.next().unwrap_or_default();
        let uid = status.next().and_then(|l| l.get(1).map(str::to_owned));
        let command = self.reader.read_cmdline(pid)?;
        Ok(OwnSources {
            stat,
            vm_size,
            uid,
            command,
        })
    }

    fn stat(&self, pid: &Pid) -> Result<FieldSequence> {
        self.reader.read_first_line(&self.reader.proc_path(pid, "stat"))
    }

    pub fn vm_size_mb(&self, pid: &Pid) -> Result<f64> {
        let line = self
            .reader
            .read_first_matching_line(&self.reader.proc_path(pid, "status"), "VmSize")?;
        vm_size_mb(&line)
    }

    /// Owning user name; empty when the uid has no database entry.
    pub fn user(&self, pid: &Pid) -> Result<String> {
        match self.reader.process_uid(pid)? {
            Some(uid) => self.reader.resolve_user_name(&uid),
            None => Ok(String::new()),
        }
    }

    pub fn command(&self, pid: &Pid) -> Result<String> {
        self.reader.read_cmdline(pid)
    }

    pub fn start_time_seconds(&self, pid: &Pid) -> Result<f64> {
        start_time_seconds(&self.stat(pid)?, self.ticks_per_second)
    }

    pub fn elapsed_seconds(&self, pid: &Pid) -> Result<f64> {
        let stat = self.stat(pid)?;
        elapsed_seconds(&stat, read_uptime(&self.reader)?, self.ticks_per_second)
    }

    pub fn cpu_percent(&self, pid: &Pid) -> Result<Option<f64>> {
        let stat = self.stat(pid)?;
        cpu_percent(&stat, read_uptime(&self.reader)?, self.ticks_per_second)
    }

    /// `Threads:` count of `pid`, or `None` if the status has no such line.
    pub fn threads(&self, pid: &Pid) -> Result<Option<u64>> {
        let line = self
            .reader
            .read_first_matching_line(&self.reader.proc_path(pid, "status"), "Threads:")?;
        if line.is_empty() {
            return Ok(None);
        }
        line.parse_at::<u64>(STATUS, KEYED_VALUE).map(Some)
    }
}
