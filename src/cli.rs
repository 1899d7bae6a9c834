//! CLI arguments and subcommands for herakles-memlab.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for a memory snapshot
#[derive(Debug, Clone, ValueEnum)]
pub enum SnapshotFormat {
    Text,
    Json,
    Yaml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-memlab",
    about = "Memory snapshots and address-space layout of the running process",
    long_about = "Memory snapshots and address-space layout of the running process.\n\n\
                  Reads page fault counters, RSS/PSS/shared/swap accounting and the \
                  mapping list from /proc/self and prints them, optionally around a \
                  lab scenario that triggers page faults.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = env!("CARGO_PKG_VERSION"),
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("VERGEN_BUILD_TIMESTAMP"), ")"),
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level, logs go to stderr [default: warn]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Override scratch buffer size (KB) for /proc reads
    #[arg(long)]
    pub buffer_kb: Option<usize>,

    /// Read status/smaps/maps from this directory instead of /proc/self
    #[arg(long)]
    pub proc_dir: Option<PathBuf>,

    /// Skip the warm-up capture before the first snapshot
    #[arg(long)]
    pub no_warm_up: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture and print one memory snapshot
    Snapshot {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: SnapshotFormat,
    },

    /// Print the coalesced address-space layout
    Maps,

    /// Run a page-fault scenario between two snapshots
    Lab {
        /// Scenario number (0 = nothing, 1-5 = fault patterns)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        scenario: u8,

        /// Do not print the address-space layout before and after
        #[arg(long)]
        no_maps: bool,
    },

    /// Check that the /proc interfaces are usable
    Check,

    /// Generate a configuration file
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}
