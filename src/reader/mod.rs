//! Snapshot reader for kernel text sources under the process metrics root.
//!
//! Every operation opens its own handle, reads what it needs and drops the
//! handle before returning. Nothing is cached: procfs content is volatile and
//! a fresh read is the only way to observe current state.

mod fields;

pub use fields::FieldSequence;

use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Numeric process identifier, kept in the textual form the kernel uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if is_all_digits(&raw) {
            Ok(Pid(raw))
        } else {
            Err(SamplerError::InvalidPid(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pid {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        Pid::new(s)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid.to_string())
    }
}

fn is_all_digits(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Reads and tokenizes kernel text sources relative to configured paths.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    proc_root: PathBuf,
    passwd_path: PathBuf,
    os_release_path: PathBuf,
}

impl SnapshotReader {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            proc_root: config.proc_root.clone(),
            passwd_path: config.passwd_path.clone(),
            os_release_path: config.os_release_path.clone(),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub fn passwd_path(&self) -> &Path {
        &self.passwd_path
    }

    pub fn os_release_path(&self) -> &Path {
        &self.os_release_path
    }

    /// `<root>/<pid>/<file>`
    pub fn proc_path(&self, pid: &Pid, file: &str) -> PathBuf {
        self.proc_root.join(pid.as_str()).join(file)
    }

    pub fn stat_path(&self) -> PathBuf {
        self.proc_root.join("stat")
    }

    pub fn meminfo_path(&self) -> PathBuf {
        self.proc_root.join("meminfo")
    }

    pub fn cpuinfo_path(&self) -> PathBuf {
        self.proc_root.join("cpuinfo")
    }

    pub fn uptime_path(&self) -> PathBuf {
        self.proc_root.join("uptime")
    }

    pub fn version_path(&self) -> PathBuf {
        self.proc_root.join("version")
    }

    /// Enumerates numeric directory entries under the process root.
    ///
    /// Order follows the filesystem. Entries that fail mid-enumeration
    /// (typically processes that just exited) are skipped.
    pub fn list_pids(&self) -> Result<Vec<Pid>> {
        let entries =
            fs::read_dir(&self.proc_root).map_err(|source| SamplerError::DirectoryUnavailable {
                path: self.proc_root.display().to_string(),
                source,
            })?;

        let mut out = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", self.proc_root.display(), e);
                    continue;
                }
            };
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(v) if is_all_digits(v) => v,
                _ => continue,
            };
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => out.push(Pid(name.to_string())),
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping pid {}: {}", name, e);
                    continue;
                }
            }
        }
        Ok(out)
    }

    /// Tokenizes the first line of `path`.
    pub fn read_first_line(&self, path: &Path) -> Result<FieldSequence> {
        let mut reader = open(path)?;
        let mut buf = Vec::new();
        Ok(match next_line(&mut reader, &mut buf, path)? {
            Some(line) => FieldSequence::from_line(&line),
            None => FieldSequence::default(),
        })
    }

    /// Tokenizes the first line of `path` starting with `key`.
    ///
    /// Returns an empty sequence if no line matches.
    pub fn read_first_matching_line(&self, path: &Path, key: &str) -> Result<FieldSequence> {
        Ok(self
            .find_line(path, key)?
            .map(|line| FieldSequence::from_line(&line))
            .unwrap_or_default())
    }

    /// Tokenizes, in a single pass, the first line starting with each of `keys`.
    ///
    /// The result is positionally aligned with `keys`; keys without a match
    /// get an empty sequence.
    pub fn read_matching_lines(&self, path: &Path, keys: &[&str]) -> Result<Vec<FieldSequence>> {
        let mut found = vec![FieldSequence::default(); keys.len()];
        let mut remaining = keys.len();
        let mut reader = open(path)?;
        let mut buf = Vec::new();
        while remaining > 0 {
            let Some(line) = next_line(&mut reader, &mut buf, path)? else {
                break;
            };
            for (slot, key) in found.iter_mut().zip(keys) {
                if slot.is_empty() && line.starts_with(key) {
                    *slot = FieldSequence::from_line(&line);
                    remaining -= 1;
                    break;
                }
            }
        }
        Ok(found)
    }

    /// Tokenizes, in a single pass, every line of `path` starting with `prefix`.
    pub fn read_lines_with_prefix(&self, path: &Path, prefix: &str) -> Result<Vec<FieldSequence>> {
        let mut out = Vec::new();
        let mut reader = open(path)?;
        let mut buf = Vec::new();
        while let Some(line) = next_line(&mut reader, &mut buf, path)? {
            if line.starts_with(prefix) {
                out.push(FieldSequence::from_line(&line));
            }
        }
        Ok(out)
    }

    /// Returns the first raw line of `path` starting with `key`.
    pub fn find_line(&self, path: &Path, key: &str) -> Result<Option<String>> {
        let mut reader = open(path)?;
        let mut buf = Vec::new();
        while let Some(line) = next_line(&mut reader, &mut buf, path)? {
            if line.starts_with(key) {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Real uid of `pid` as written in its status file (`Uid:` field 1).
    pub fn process_uid(&self, pid: &Pid) -> Result<Option<String>> {
        let fields = self.read_first_matching_line(&self.proc_path(pid, "status"), "Uid:")?;
        Ok(fields.get(1).map(str::to_owned))
    }

    /// Maps a numeric uid to its login name via the user database.
    ///
    /// An unknown uid yields an empty string.
    pub fn resolve_user_name(&self, uid: &str) -> Result<String> {
        let path = self.passwd_path.as_path();
        let mut reader = open(path)?;
        let mut buf = Vec::new();
        while let Some(line) = next_line(&mut reader, &mut buf, path)? {
            if line.starts_with('#') {
                continue;
            }
            // name:password:uid:gid:gecos:home:shell
            let mut parts = line.split(':');
            let name = parts.next().unwrap_or_default();
            if parts.nth(1) == Some(uid) && !name.is_empty() {
                return Ok(name.to_string());
            }
        }
        debug!("uid {} not found in {}", uid, path.display());
        Ok(String::new())
    }

    /// Whether the directory of `pid` can currently be opened.
    pub fn pid_exists(&self, pid: &Pid) -> bool {
        fs::read_dir(self.proc_root.join(pid.as_str())).is_ok()
    }

    /// Command line of `pid` with argument separators rendered as spaces.
    ///
    /// Kernel threads have an empty cmdline and yield an empty string.
    pub fn read_cmdline(&self, pid: &Pid) -> Result<String> {
        let path = self.proc_path(pid, "cmdline");
        let raw = fs::read(&path).map_err(|e| SamplerError::source_unavailable(&path, e))?;
        let first = raw.split(|&b| b == b'\n').next().unwrap_or_default();
        let line: Vec<u8> = first
            .iter()
            .map(|&b| if b == 0 { b' ' } else { b })
            .collect();
        Ok(String::from_utf8_lossy(&line).trim_end().to_string())
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| SamplerError::source_unavailable(path, e))
}

/// Reads one line, tolerating non-UTF-8 bytes (process names may contain any).
fn next_line(
    reader: &mut BufReader<File>,
    buf: &mut Vec<u8>,
    path: &Path,
) -> Result<Option<String>> {
    buf.clear();
    let n = reader
        .read_until(b'\n', buf)
        .map_err(|e| SamplerError::source_unavailable(path, e))?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}
