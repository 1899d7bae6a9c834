//! CLI command implementations for herakles-memlab.
//!
//! This module provides implementations for all CLI subcommands:
//! - `snapshot`: One memory record
//! - `maps`: Address-space layout
//! - `lab`: Page-fault scenario between two records
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod lab;
pub mod maps;
pub mod snapshot;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use lab::command_lab;
pub use maps::command_maps;
pub use snapshot::command_snapshot;
