//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates a configuration file with default values.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = render_config(&Config::default(), &format)?;
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(match format {
            ConfigFormat::Yaml => "herakles-memlab.yaml",
            ConfigFormat::Json => "herakles-memlab.json",
            ConfigFormat::Toml => "herakles-memlab.toml",
        }),
    };

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}
