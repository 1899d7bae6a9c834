//! Coarse memory counters from `/proc/self/status`.
//!
//! Each `Vm*` label appears exactly once, so values are assigned. The kernel
//! reports them in kB.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::labels::labeled_values;
use super::RecordSource;
use crate::buffer::ProcBuffer;
use crate::error::RecordError;
use crate::record::{Field, PartialRecord, Reducer};

const STATUS_FIELDS: &[(&str, Field)] = &[
    ("VmRSS", Field::Resident),
    ("VmPTE", Field::PageTable),
    ("VmSize", Field::Virtual),
    ("VmSwap", Field::Swap),
];

pub struct StatusSource {
    path: PathBuf,
}

impl StatusSource {
    pub fn new(proc_dir: &Path) -> Self {
        Self {
            path: proc_dir.join("status"),
        }
    }
}

impl Default for StatusSource {
    fn default() -> Self {
        Self::new(Path::new(crate::PROC_SELF))
    }
}

impl RecordSource for StatusSource {
    fn name(&self) -> &'static str {
        "status"
    }

    fn collect(&self, buffer: &mut ProcBuffer) -> Result<PartialRecord, RecordError> {
        let outcome = buffer.read_file(&self.path)?;
        if outcome.truncated {
            warn!(
                "{} filled the {} byte buffer, values may be missing",
                self.path.display(),
                buffer.capacity()
            );
        }

        Ok(parse_status(&buffer.text()))
    }
}

/// Parses status text into the fields it owns.
pub fn parse_status(text: &str) -> PartialRecord {
    let mut partial = PartialRecord::new();
    for lv in labeled_values(text) {
        if let Some(&(_, field)) = STATUS_FIELDS.iter().find(|(label, _)| *label == lv.label) {
            partial.reduce(field, Reducer::Assign, lv.value.saturating_mul(1024));
        }
    }
    debug!("status: {} of {} fields found", partial.iter().count(), STATUS_FIELDS.len());
    partial
}
