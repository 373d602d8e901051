//! herakles-proc-sampler - version 0.1.0
//!
//! Point-in-time Linux system and process metrics with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use herakles_proc_sampler::config::{
    config_warnings, find_config_path, render_config, validate_effective_config, SamplerConfig,
};
use herakles_proc_sampler::{schema, SnapshotReader};
use tracing::{debug, info, warn, Level};

use cli::{resolve_config, Args, Commands, LogLevel};
use commands::{command_check, command_cpu, command_list, command_process, command_system};

/// Initializes tracing logging subsystem with the effective log level.
fn setup_logging(level: LogLevel) {
    let log_level = match level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    // stdout carries the reports
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    debug!("Logging initialized with level: {:?}", level);
}

/// Loads and validates configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> SamplerConfig {
    let config = match resolve_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    config
}

/// Stops the run before dispatch when procfs has an unexpected layout.
/// `check` reports layout problems itself.
fn verify_layout(config: &SamplerConfig, command: Option<&Commands>) -> anyhow::Result<()> {
    if matches!(command, Some(Commands::Check)) {
        return Ok(());
    }
    schema::validate(&SnapshotReader::new(config)).with_context(|| {
        format!(
            "procfs layout check failed for {}",
            config.proc_root.display()
        )
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_validated_config(&args);

    if args.check_config {
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        print!("{}", render_config(&config, args.config_format.into())?);
        return Ok(());
    }

    setup_logging(LogLevel::resolve(args.log_level, &config));
    if args.no_config {
        debug!("Config file loading disabled");
    } else {
        match find_config_path(args.config.as_deref()) {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => debug!("No config file found, using defaults"),
        }
    }
    for warning in config_warnings(&config) {
        warn!("{}", warning);
    }
    info!(
        "Using proc root {} ({} clock ticks/s)",
        config.proc_root.display(),
        config.clock_ticks_per_second()
    );

    verify_layout(&config, args.command.as_ref())?;

    let format = args.format;
    match args.command {
        None | Some(Commands::System) => command_system(&config, format),
        Some(Commands::Cpu {
            core,
            count,
            all_cores,
            ..
        }) => command_cpu(&config, core, count, all_cores, format),
        Some(Commands::Process { pid }) => command_process(&config, &pid, format),
        Some(Commands::List { limit }) => command_list(&config, limit, format),
        Some(Commands::Check) => command_check(&config),
    }
}
