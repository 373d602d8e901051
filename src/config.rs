//! Configuration management for herakles-proc-sampler.
//!
//! This module handles loading and validating the sampler configuration from
//! files. It supports YAML, JSON, and TOML formats. Precedence between CLI
//! flags and file values is applied by the binary on top of [`load_config`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// Default configuration constants
pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";
pub const DEFAULT_OS_RELEASE_PATH: &str = "/etc/os-release";
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const FALLBACK_CLOCK_TICKS: u64 = 100;

/// Default config file locations, searched in order.
pub const DEFAULT_CONFIG_LOCATIONS: [&str; 6] = [
    "/etc/herakles/proc-sampler.yaml",
    "/etc/herakles/proc-sampler.yml",
    "/etc/herakles/proc-sampler.json",
    "./herakles-proc-sampler.yaml",
    "./herakles-proc-sampler.yml",
    "./herakles-proc-sampler.json",
];

/// Errors raised while loading, validating or rendering configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to render TOML configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("{0}")]
    Invalid(String),
}

fn default_proc_root() -> PathBuf {
    PathBuf::from(DEFAULT_PROC_ROOT)
}
fn default_passwd_path() -> PathBuf {
    PathBuf::from(DEFAULT_PASSWD_PATH)
}
fn default_os_release_path() -> PathBuf {
    PathBuf::from(DEFAULT_OS_RELEASE_PATH)
}
fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

/// Sampler configuration: where the kernel sources live and how to scale ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Mount point of the process metrics filesystem (default: /proc)
    #[serde(default = "default_proc_root", alias = "proc-root")]
    pub proc_root: PathBuf,

    /// User database used for uid -> name resolution (default: /etc/passwd)
    #[serde(default = "default_passwd_path", alias = "passwd-path")]
    pub passwd_path: PathBuf,

    /// OS release file holding PRETTY_NAME (default: /etc/os-release)
    #[serde(default = "default_os_release_path", alias = "os-release-path")]
    pub os_release_path: PathBuf,

    /// Clock ticks per second; detected from sysconf when unset
    #[serde(default, alias = "clock-ticks")]
    pub clock_ticks: Option<u64>,

    /// Delay between the two CPU samples of a rate computation (default: 1000)
    #[serde(default = "default_interval_ms", alias = "interval-ms")]
    pub interval_ms: u64,

    // Logging
    #[serde(default, alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            passwd_path: default_passwd_path(),
            os_release_path: default_os_release_path(),
            clock_ticks: None,
            interval_ms: DEFAULT_INTERVAL_MS,
            log_level: None,
        }
    }
}

impl SamplerConfig {
    /// Builds a config rooted at `proc_root` with detected clock ticks.
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            ..Self::default()
        }
    }

    /// Effective clock ticks per second: configured value or the platform's.
    pub fn clock_ticks_per_second(&self) -> f64 {
        self.clock_ticks.unwrap_or_else(detect_clock_ticks) as f64
    }
}

/// Get system clock ticks per second (usually 100, but can vary).
pub fn detect_clock_ticks() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        let tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if tck > 0 {
            return tck as u64;
        }
    }
    debug!(
        "sysconf(_SC_CLK_TCK) unavailable, falling back to {}",
        FALLBACK_CLOCK_TICKS
    );
    FALLBACK_CLOCK_TICKS
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &SamplerConfig) -> Result<(), ConfigError> {
    let paths = [
        ("proc_root", &cfg.proc_root),
        ("passwd_path", &cfg.passwd_path),
        ("os_release_path", &cfg.os_release_path),
    ];
    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
        }
    }

    if cfg.clock_ticks == Some(0) {
        return Err(ConfigError::Invalid(
            "clock_ticks must be greater than zero".into(),
        ));
    }

    if cfg.interval_ms == 0 {
        return Err(ConfigError::Invalid(
            "interval_ms must be greater than zero".into(),
        ));
    }

    if let Some(level) = cfg.log_level.as_deref() {
        match level.to_ascii_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Invalid log_level '{}', expected off/error/warn/info/debug/trace",
                    other
                )));
            }
        }
    }

    Ok(())
}

/// Non-fatal problems with an otherwise valid config, for logging once
/// the subscriber is installed.
pub fn config_warnings(cfg: &SamplerConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if !cfg.proc_root.exists() {
        warnings.push(format!("proc_root {} does not exist", cfg.proc_root.display()));
    }
    if !cfg.passwd_path.exists() {
        warnings.push(format!(
            "passwd_path {} does not exist, user lookups will fail",
            cfg.passwd_path.display()
        ));
    }
    warnings
}

/// The file `load_config` reads: `path` itself, or the first default
/// location that exists.
pub fn find_config_path(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(p) => Some(p.to_path_buf()),
        None => DEFAULT_CONFIG_LOCATIONS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf),
    }
}

/// Loads configuration from `path`, or from the first default location found.
///
/// Returns the default configuration when no file exists.
pub fn load_config(path: Option<&Path>) -> Result<SamplerConfig, ConfigError> {
    let Some(path) = find_config_path(path) else {
        return Ok(SamplerConfig::default());
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let config = parse_config(&content, &path)?;
    debug!("Parsed configuration from: {}", path.display());
    Ok(config)
}

/// Parses config content, choosing the format from the file extension.
pub fn parse_config(content: &str, path: &Path) -> Result<SamplerConfig, ConfigError> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(serde_json::from_str(content)?),
        Some("toml") => Ok(toml::from_str(content)?),
        // Default to YAML
        _ => Ok(serde_yaml::from_str(content)?),
    }
}

/// Output formats for rendering configuration and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Yaml,
    Json,
    Toml,
}

/// Renders the configuration in the requested format.
pub fn render_config(config: &SamplerConfig, format: RenderFormat) -> Result<String, ConfigError> {
    let output = match format {
        RenderFormat::Json => serde_json::to_string_pretty(config)?,
        RenderFormat::Toml => toml::to_string_pretty(config)?,
        RenderFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}
