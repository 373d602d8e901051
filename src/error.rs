//! Error types for snapshot reading and metric calculation.
//!
//! Only genuine faults are errors. A key missing from a readable source, a
//! process that exited between discovery and read, and a zero denominator
//! are expressed as empty sequences or `None` by the functions that
//! produce them.

use std::io;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, SamplerError>;

/// Errors that can occur when reading kernel text sources.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// A required file could not be opened or read.
    #[error("source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The process root could not be opened or iterated.
    #[error("directory unavailable: {path}: {source}")]
    DirectoryUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A field sequence is shorter than its positional schema requires.
    #[error("{source_name}: expected at least {needed} fields, found {found}")]
    SchemaMismatch {
        source_name: &'static str,
        needed: usize,
        found: usize,
    },

    /// A key required to assemble a composite snapshot is absent.
    #[error("missing field '{field}' in {path}")]
    MissingField { path: String, field: &'static str },

    /// A token could not be parsed as a number.
    #[error("failed to parse value from {path}: {detail}")]
    Parse { path: String, detail: String },

    /// A process identifier that is not a string of decimal digits.
    #[error("invalid pid '{0}': expected decimal digits")]
    InvalidPid(String),
}

impl SamplerError {
    pub(crate) fn source_unavailable(path: &std::path::Path, source: io::Error) -> Self {
        SamplerError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        }
    }

    /// Returns `true` when the error means the underlying file is gone.
    ///
    /// Used to tell a process that exited mid-read apart from other faults.
    pub fn is_not_found(&self) -> bool {
        match self {
            SamplerError::SourceUnavailable { source, .. }
            | SamplerError::DirectoryUnavailable { source, .. } => {
                // ESRCH surfaces when a /proc/<pid> entry is torn down under an open
                matches!(source.kind(), io::ErrorKind::NotFound)
                    || source.raw_os_error() == Some(libc::ESRCH)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message() {
        let err = SamplerError::SchemaMismatch {
            source_name: "/proc/stat cpu line",
            needed: 11,
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "/proc/stat cpu line: expected at least 11 fields, found 5"
        );
    }

    #[test]
    fn test_is_not_found() {
        let err = SamplerError::source_unavailable(
            std::path::Path::new("/proc/999999/status"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.is_not_found());

        let err = SamplerError::source_unavailable(
            std::path::Path::new("/proc/1/status"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());

        assert!(!SamplerError::InvalidPid("abc".into()).is_not_found());
    }
}
