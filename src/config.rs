//! Configuration management for herakles-memlab.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use herakles_memlab::{ANONYMOUS_MAPPING, DEFAULT_BUFFER_KB, PROC_SELF};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Upper bound for the scratch buffer (64 MB).
pub const MAX_BUFFER_KB: usize = 64 * 1024;

/// Effective configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scratch buffer size for /proc reads, in KB
    #[serde(alias = "buffer-kb")]
    pub buffer_kb: Option<usize>,

    /// Directory holding status/smaps/maps
    #[serde(alias = "proc-dir")]
    pub proc_dir: Option<PathBuf>,

    /// Name printed for mappings without a backing file
    #[serde(alias = "anonymous-label")]
    pub anonymous_label: Option<String>,

    /// Capture once and discard before the first real snapshot
    #[serde(alias = "warm-up")]
    pub warm_up: Option<bool>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_kb: Some(DEFAULT_BUFFER_KB),
            proc_dir: Some(PathBuf::from(PROC_SELF)),
            anonymous_label: Some(ANONYMOUS_MAPPING.to_string()),
            warm_up: Some(true),
            log_level: Some("warn".into()),
        }
    }
}

impl Config {
    pub fn buffer_kb(&self) -> usize {
        self.buffer_kb.unwrap_or(DEFAULT_BUFFER_KB)
    }

    pub fn proc_dir(&self) -> PathBuf {
        self.proc_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(PROC_SELF))
    }

    pub fn anonymous_label(&self) -> &str {
        self.anonymous_label.as_deref().unwrap_or(ANONYMOUS_MAPPING)
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(kb) = cfg.buffer_kb {
        if kb == 0 {
            return Err("buffer_kb must be greater than 0".into());
        }
        if kb > MAX_BUFFER_KB {
            return Err(format!("buffer_kb {} exceeds maximum of {}", kb, MAX_BUFFER_KB).into());
        }
    }

    if let Some(label) = cfg.anonymous_label.as_deref() {
        if label.is_empty() {
            return Err("anonymous_label must not be empty".into());
        }
    }

    if let Some(dir) = cfg.proc_dir.as_deref() {
        if dir.as_os_str().is_empty() {
            return Err("proc_dir must not be empty".into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(kb) = args.buffer_kb {
        config.buffer_kb = Some(kb);
    }
    if let Some(dir) = &args.proc_dir {
        config.proc_dir = Some(dir.clone());
    }
    if args.no_warm_up {
        config.warm_up = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            // Try default locations
            let defaults = [
                "/etc/herakles/memlab.yaml",
                "/etc/herakles/memlab.yml",
                "/etc/herakles/memlab.json",
                "./herakles-memlab.yaml",
                "./herakles-memlab.yml",
                "./herakles-memlab.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    if !path.exists() {
        return Err(format!("config file not found: {}", path.display()).into());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Serializes configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_effective_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_buffer_sizes() {
        let cfg = Config {
            buffer_kb: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());

        let cfg = Config {
            buffer_kb: Some(MAX_BUFFER_KB + 1),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_anonymous_label_validation() {
        let cfg = Config {
            anonymous_label: Some("[heap spill]".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_ok());

        let cfg = Config {
            anonymous_label: Some(String::new()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_load_yaml_config() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "buffer_kb: 64\nanonymous-label: \"[anon]\"").unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.buffer_kb, Some(64));
        assert_eq!(cfg.anonymous_label(), "[anon]");
        assert_eq!(cfg.warm_up, None);
        assert_eq!(cfg.proc_dir(), PathBuf::from(PROC_SELF));
    }

    #[test]
    fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"buffer_kb": 128, "warm_up": false}}"#).unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.buffer_kb(), 128);
        assert_eq!(cfg.warm_up, Some(false));
    }

    #[test]
    fn test_load_toml_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "buffer_kb = 256\nproc_dir = \"/tmp/fixture\"").unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.buffer_kb(), 256);
        assert_eq!(cfg.proc_dir(), PathBuf::from("/tmp/fixture"));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_render_roundtrips_through_yaml() {
        let rendered = render_config(&Config::default(), &ConfigFormat::Yaml).unwrap();
        let parsed: Config = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed.buffer_kb(), DEFAULT_BUFFER_KB);
        assert_eq!(parsed.anonymous_label(), ANONYMOUS_MAPPING);
    }
}
