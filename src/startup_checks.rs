//! Runtime requirement validation for herakles-memlab.
//!
//! Every snapshot depends on three pseudo-files and on getrusage(). This
//! module probes each of them once so that a missing interface is reported
//! up front instead of as a fatal error in the middle of a lab run.

use std::path::Path;

use herakles_memlab::{ProcBuffer, RecordSource, RusageSource};
use tracing::{error, info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(proc_dir: &Path, buffer: &mut ProcBuffer) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_rusage(buffer)?;
    for name in ["status", "smaps", "maps"] {
        check_proc_file(&proc_dir.join(name), buffer)?;
    }

    info!("✅ All runtime requirements validated");
    Ok(())
}

fn check_rusage(buffer: &mut ProcBuffer) -> Result<(), ValidationError> {
    match RusageSource.collect(buffer) {
        Ok(_) => {
            info!("✅ getrusage(RUSAGE_SELF) available");
            Ok(())
        }
        Err(e) => {
            error!("❌ getrusage failed: {}", e);
            Err(ValidationError::Rusage(e.to_string()))
        }
    }
}

/// Reads one pseudo-file completely and reports whether it fit the buffer.
fn check_proc_file(path: &Path, buffer: &mut ProcBuffer) -> Result<(), ValidationError> {
    match buffer.read_file(path) {
        Ok(outcome) if outcome.truncated => {
            warn!(
                "⚠️  {} fills the {} KB buffer - output will be truncated",
                path.display(),
                buffer.capacity() / 1024
            );
            warn!("   Recommendation: raise --buffer-kb");
            Err(ValidationError::BufferTooSmall(path.display().to_string()))
        }
        Ok(outcome) if outcome.bytes == 0 => {
            warn!("⚠️  {} is empty", path.display());
            Err(ValidationError::Empty(path.display().to_string()))
        }
        Ok(outcome) => {
            info!(
                "✅ {} readable ({} of {} KB buffer used)",
                path.display(),
                outcome.bytes.div_ceil(1024),
                buffer.capacity() / 1024
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ {}", e);
            Err(ValidationError::Unreadable(e.to_string()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("resource usage unavailable: {0}")]
    Rusage(String),

    #[error("{0}")]
    Unreadable(String),

    #[error("{0} is empty")]
    Empty(String),

    #[error("{0} does not fit the scratch buffer")]
    BufferTooSmall(String),
}
