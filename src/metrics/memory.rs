//! System RAM utilisation from `/proc/meminfo`.

use crate::error::{Result, SamplerError};
use crate::reader::{FieldSequence, SnapshotReader};
use crate::schema::KEYED_VALUE;
use serde::Serialize;

const MEMINFO: &str = "/proc/meminfo";
const KEYS: [(&str, &str); 3] = [
    ("MemTotal:", "MemTotal"),
    ("MemFree:", "MemFree"),
    ("Buffers:", "Buffers"),
];

/// The three meminfo quantities RAM percent is derived from, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemorySnapshot {
    pub total_kb: f64,
    pub free_kb: f64,
    pub buffers_kb: f64,
}

impl MemorySnapshot {
    /// Reads `MemTotal:`, `MemFree:` and `Buffers:` in one pass over meminfo.
    pub fn read(reader: &SnapshotReader) -> Result<Self> {
        let path = reader.meminfo_path();
        let keys = KEYS.map(|(prefix, _)| prefix);
        let lines = reader.read_matching_lines(&path, &keys)?;
        Self::from_lines(&lines).map_err(|e| match e {
            SamplerError::MissingField { field, .. } => SamplerError::MissingField {
                path: path.display().to_string(),
                field,
            },
            other => other,
        })
    }

    /// Builds a snapshot from the `MemTotal:`, `MemFree:` and `Buffers:`
    /// lines, in that order.
    pub fn from_lines(lines: &[FieldSequence]) -> Result<Self> {
        let value = |idx: usize| -> Result<f64> {
            let (_, field) = KEYS[idx];
            match lines.get(idx) {
                Some(seq) if !seq.is_empty() => seq.parse_at::<f64>(MEMINFO, KEYED_VALUE),
                _ => Err(SamplerError::MissingField {
                    path: MEMINFO.to_string(),
                    field,
                }),
            }
        };
        Ok(Self {
            total_kb: value(0)?,
            free_kb: value(1)?,
            buffers_kb: value(2)?,
        })
    }

    /// `100 × (1 − free / (total − buffers))`
    ///
    /// Returns `None` when total equals buffers.
    pub fn ram_percent(&self) -> Option<f64> {
        let denominator = self.total_kb - self.buffers_kb;
        if denominator == 0.0 || !denominator.is_finite() {
            return None;
        }
        Some(100.0 * (1.0 - self.free_kb / denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use std::fs;
    use tempfile::tempdir;

    fn reader_with_meminfo(content: &str) -> (tempfile::TempDir, SnapshotReader) {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("meminfo"), content).expect("Failed to write meminfo");
        let reader = SnapshotReader::new(&SamplerConfig::with_proc_root(dir.path()));
        (dir, reader)
    }

    #[test]
    fn test_ram_percent() {
        let (_dir, reader) = reader_with_meminfo(
            "MemTotal:           1000 kB\n\
             MemFree:             400 kB\n\
             MemAvailable:        700 kB\n\
             Buffers:             100 kB\n\
             Cached:              200 kB\n",
        );
        let snapshot = MemorySnapshot::read(&reader).expect("read");
        assert_eq!(snapshot.total_kb, 1000.0);
        assert_eq!(snapshot.free_kb, 400.0);
        assert_eq!(snapshot.buffers_kb, 100.0);

        let pct = snapshot.ram_percent().expect("non-degenerate");
        let expected = 100.0 * (1.0 - 400.0 / 900.0);
        assert!((pct - expected).abs() < 1e-9);
        assert!((pct - 55.56).abs() < 0.01);
    }

    #[test]
    fn test_ram_percent_degenerate() {
        let snapshot = MemorySnapshot {
            total_kb: 500.0,
            free_kb: 10.0,
            buffers_kb: 500.0,
        };
        assert_eq!(snapshot.ram_percent(), None);
    }

    #[test]
    fn test_read_missing_field() {
        let (_dir, reader) = reader_with_meminfo("MemTotal: 1000 kB\nMemFree: 400 kB\n");
        match MemorySnapshot::read(&reader) {
            Err(SamplerError::MissingField { field, path }) => {
                assert_eq!(field, "Buffers");
                assert!(path.ends_with("meminfo"));
            }
            other => panic!("expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_read_is_idempotent() {
        let (_dir, reader) =
            reader_with_meminfo("MemTotal: 2048 kB\nMemFree: 1024 kB\nBuffers: 48 kB\n");
        let a = MemorySnapshot::read(&reader).expect("read");
        let b = MemorySnapshot::read(&reader).expect("read");
        assert_eq!(a, b);
        assert_eq!(a.ram_percent(), b.ram_percent());
    }
}
