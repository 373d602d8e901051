//! Positional field layout of the kernel text sources.
//!
//! Indices are 0-based token positions after whitespace splitting, following
//! proc(5). Each source also declares the minimum token count a line must
//! have before any of its indices may be read.

use crate::error::Result;
use crate::reader::{FieldSequence, Pid, SnapshotReader};
use tracing::{debug, error};

/// Minimum shape of one kind of line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSchema {
    pub name: &'static str,
    pub min_fields: usize,
}

impl SourceSchema {
    pub fn check(&self, fields: &FieldSequence) -> Result<()> {
        fields.require_len(self.name, self.min_fields)
    }
}

/// `/proc/<pid>/stat`
pub mod pid_stat {
    use super::SourceSchema;

    pub const UTIME: usize = 13;
    pub const STIME: usize = 14;
    pub const CUTIME: usize = 15;
    pub const CSTIME: usize = 16;
    pub const STARTTIME: usize = 21;

    pub const SCHEMA: SourceSchema = SourceSchema {
        name: "/proc/<pid>/stat",
        min_fields: STARTTIME + 1,
    };
}

/// `cpu`/`cpuN` lines of `/proc/stat`. Position 0 is the label.
pub mod cpu_line {
    use super::SourceSchema;

    pub const USER: usize = 1;
    pub const NICE: usize = 2;
    pub const SYSTEM: usize = 3;
    pub const IDLE: usize = 4;
    pub const IOWAIT: usize = 5;
    pub const IRQ: usize = 6;
    pub const SOFTIRQ: usize = 7;
    pub const STEAL: usize = 8;
    pub const GUEST: usize = 9;
    pub const GUEST_NICE: usize = 10;

    pub const SCHEMA: SourceSchema = SourceSchema {
        name: "/proc/stat cpu line",
        min_fields: GUEST_NICE + 1,
    };
}

/// `Key:  value [unit]` lines (status, meminfo): the value sits at 1.
pub const KEYED_VALUE: usize = 1;

/// `cpu cores\t: 4` in cpuinfo splits into `cpu`, `cores`, `:`, `4`.
pub const CPUINFO_CORES: usize = 3;

/// `Linux version 6.1.0-13-amd64 (...)`
pub const KERNEL_VERSION: usize = 2;

/// First token of `/proc/uptime`.
pub const UPTIME_SECONDS: usize = 0;

/// Checks the live sources against the schema tables.
///
/// Reads the aggregate CPU line and this process's own stat line. Intended
/// to run once at startup so a kernel with an unexpected layout fails with a
/// clear message instead of producing meaningless numbers.
pub fn validate(reader: &SnapshotReader) -> Result<()> {
    let cpu = reader.read_first_matching_line(&reader.stat_path(), "cpu ")?;
    if let Err(e) = cpu_line::SCHEMA.check(&cpu) {
        error!("Unsupported /proc/stat layout: {}", e);
        return Err(e);
    }

    let own = Pid::from(std::process::id());
    if reader.pid_exists(&own) {
        let stat = reader.read_first_line(&reader.proc_path(&own, "stat"))?;
        if let Err(e) = pid_stat::SCHEMA.check(&stat) {
            error!("Unsupported /proc/<pid>/stat layout: {}", e);
            return Err(e);
        }
    } else {
        debug!(
            "Own pid {} not present under {}, skipping stat layout check",
            own,
            reader.proc_root().display()
        );
    }

    debug!("Source layouts match schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use crate::error::SamplerError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_schema_minimums() {
        assert_eq!(cpu_line::SCHEMA.min_fields, 11);
        assert_eq!(pid_stat::SCHEMA.min_fields, 22);
    }

    #[test]
    fn test_validate_accepts_full_cpu_line() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("stat"), "cpu  1 2 3 4 5 6 7 8 9 10\n")
            .expect("Failed to write stat");
        let reader = SnapshotReader::new(&SamplerConfig::with_proc_root(dir.path()));
        assert!(validate(&reader).is_ok());
    }

    #[test]
    fn test_validate_rejects_short_cpu_line() {
        let dir = tempdir().expect("Failed to create temp dir");
        // Pre-2.6.33 layout without guest/guest_nice
        fs::write(dir.path().join("stat"), "cpu  1 2 3 4 5 6 7 8\n").expect("Failed to write stat");
        let reader = SnapshotReader::new(&SamplerConfig::with_proc_root(dir.path()));

        match validate(&reader) {
            Err(SamplerError::SchemaMismatch { needed, found, .. }) => {
                assert_eq!(needed, 11);
                assert_eq!(found, 9);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_short_own_stat() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("stat"), "cpu  1 2 3 4 5 6 7 8 9 10\n")
            .expect("Failed to write stat");
        let own = dir.path().join(std::process::id().to_string());
        fs::create_dir(&own).expect("Failed to create dir");
        fs::write(own.join("stat"), "1234 (short) S 1 2 3").expect("Failed to write stat");
        let reader = SnapshotReader::new(&SamplerConfig::with_proc_root(dir.path()));

        assert!(matches!(
            validate(&reader),
            Err(SamplerError::SchemaMismatch { .. })
        ));
    }
}
