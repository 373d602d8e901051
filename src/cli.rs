//! CLI arguments and subcommands for herakles-proc-sampler.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands, and merges them over the
//! file configuration.

use clap::{Parser, Subcommand, ValueEnum};
use herakles_proc_sampler::config::{load_config, ConfigError, RenderFormat, SamplerConfig};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Effective level: CLI flag, then config `log_level`, then `warn`.
    pub fn resolve(cli: Option<LogLevel>, config: &SamplerConfig) -> LogLevel {
        cli.or_else(|| {
            config
                .log_level
                .as_deref()
                .and_then(|s| LogLevel::from_str(s, true).ok())
        })
        .unwrap_or(LogLevel::Warn)
    }
}

/// Output format options for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Configuration format options for --show-config
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl From<ConfigFormat> for RenderFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Yaml => RenderFormat::Yaml,
            ConfigFormat::Json => RenderFormat::Json,
            ConfigFormat::Toml => RenderFormat::Toml,
        }
    }
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-proc-sampler",
    about = "Point-in-time Linux system and process metrics from /proc",
    long_about = "Point-in-time Linux system and process metrics from /proc.\n\n\
                  Reads CPU, memory and process state from the kernel's procfs and \
                  prints normalized percentages, counts and durations. CPU utilisation \
                  is computed from two samples taken an interval apart.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    /// Defaults to `system` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Mount point of procfs (override config)
    #[arg(long, global = true)]
    pub proc_root: Option<PathBuf>,

    /// User database for uid resolution (override config)
    #[arg(long, global = true)]
    pub passwd: Option<PathBuf>,

    /// OS release file (override config)
    #[arg(long, global = true)]
    pub os_release: Option<PathBuf>,

    /// Clock ticks per second (default: detected via sysconf)
    #[arg(long, global = true)]
    pub clock_ticks: Option<u64>,

    /// Log level (override config; default: warn)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Output format for reports
    #[arg(short = 'f', long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Print effective merged config and exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml", global = true)]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long, global = true)]
    pub check_config: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One-shot system summary (OS, kernel, cores, uptime, RAM, processes, threads)
    System,

    /// CPU utilisation between samples taken an interval apart
    Cpu {
        /// Core index; aggregate of all cores when omitted
        #[arg(long)]
        core: Option<u32>,

        /// Delay between samples in milliseconds (override config)
        #[arg(short = 'i', long)]
        interval_ms: Option<u64>,

        /// Number of rates to print
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Report every core instead of a single scope
        #[arg(long, conflicts_with = "core")]
        all_cores: bool,
    },

    /// Metrics of a single process
    Process {
        /// Process id
        pid: String,
    },

    /// Metrics of every process currently listed
    List {
        /// Stop after this many processes
        #[arg(short = 'l', long)]
        limit: Option<usize>,
    },

    /// Validate procfs access and source layouts
    Check,
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<SamplerConfig, ConfigError> {
    let mut config = if args.no_config {
        SamplerConfig::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(root) = &args.proc_root {
        config.proc_root = root.clone();
    }
    if let Some(passwd) = &args.passwd {
        config.passwd_path = passwd.clone();
    }
    if let Some(os_release) = &args.os_release {
        config.os_release_path = os_release.clone();
    }
    if args.clock_ticks.is_some() {
        config.clock_ticks = args.clock_ticks;
    }
    if let Some(Commands::Cpu {
        interval_ms: Some(ms),
        ..
    }) = &args.command
    {
        config.interval_ms = *ms;
    }

    Ok(config)
}
