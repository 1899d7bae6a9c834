//! herakles-memlab - version 0.1.0
//!
//! Memory snapshot tool with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;
mod config;
mod startup_checks;

use clap::{Parser, ValueEnum};
use herakles_memlab::{ProcBuffer, Recorder};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};

use cli::{Args, Commands, LogLevel, SnapshotFormat};
use commands::{command_check, command_config, command_lab, command_maps, command_snapshot};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config, args: &Args) {
    let level = args
        .log_level
        .clone()
        .or_else(|| {
            config
                .log_level
                .as_deref()
                .and_then(|s| LogLevel::from_str(s, true).ok())
        })
        .unwrap_or(LogLevel::Warn);

    let filter = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    debug!("Logging initialized with level: {:?}", level);
}

/// Builds the recorder over the configured /proc directory and buffer size.
fn build_recorder(config: &Config) -> Recorder {
    Recorder::for_proc_dir(
        &config.proc_dir(),
        ProcBuffer::with_capacity_kb(config.buffer_kb()),
    )
}

fn run(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut recorder = build_recorder(config);

    match &args.command {
        None => command_snapshot(SnapshotFormat::Text, config, &mut recorder),
        Some(Commands::Snapshot { format }) => command_snapshot(format.clone(), config, &mut recorder),
        Some(Commands::Maps) => command_maps(config, &mut recorder),
        Some(Commands::Lab { scenario, no_maps }) => {
            command_lab(*scenario, !*no_maps, config, &mut recorder)
        }
        Some(Commands::Check) => command_check(config, &mut recorder),
        Some(Commands::Config { .. }) => unreachable!("Config handled before setup"),
    }
}

/// Main application entry point.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config generation needs neither config loading nor logging
    if let Some(Commands::Config { output, format }) = &args.command {
        return command_config(output.clone(), format.clone());
    }

    let config = resolve_config(&args)?;

    if args.check_config {
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return show_config(&config, args.config_format.clone());
    }

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config, &args);
    info!(
        "Reading {} with a {} KB buffer",
        config.proc_dir().display(),
        config.buffer_kb()
    );

    // /proc failures mean the host cannot be introspected; there is no retry
    if let Err(e) = run(&args, &config) {
        error!("❌ {}", e);
        std::process::exit(1);
    }
    Ok(())
}
