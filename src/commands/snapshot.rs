//! Snapshot command implementation.
//!
//! Captures one memory record and prints it.

use std::io::{self, Write};

use herakles_memlab::{write_record, Recorder};

use crate::cli::SnapshotFormat;
use crate::config::Config;

/// Captures and prints a single snapshot.
pub fn command_snapshot(
    format: SnapshotFormat,
    config: &Config,
    recorder: &mut Recorder,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.warm_up.unwrap_or(true) {
        recorder.warm_up()?;
    }
    let record = recorder.capture()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        SnapshotFormat::Text => write_record(&mut out, None, &record)?,
        SnapshotFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?,
        SnapshotFormat::Yaml => write!(out, "{}", serde_yaml::to_string(&record)?)?,
    }
    Ok(())
}
