//! Detailed memory counters from `/proc/self/smaps`.
//!
//! smaps holds one block of fields per mapping, so every matching label is
//! summed over the whole file. These sums are more precise than the status
//! counters and replace them for resident, virtual and swap bytes.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::labels::labeled_values;
use super::RecordSource;
use crate::buffer::ProcBuffer;
use crate::error::RecordError;
use crate::record::{Field, PartialRecord, Reducer};

const SMAPS_FIELDS: &[(&str, Field)] = &[
    ("Rss", Field::Resident),
    ("Pss", Field::Proportional),
    ("Size", Field::Virtual),
    ("Swap", Field::Swap),
    ("Shared_Clean", Field::Shared),
    ("Shared_Dirty", Field::Shared),
];

/// Fields smaps always reports, even when the file has no mappings.
const OWNED_FIELDS: &[Field] = &[
    Field::Resident,
    Field::Proportional,
    Field::Virtual,
    Field::Swap,
    Field::Shared,
];

pub struct SmapsSource {
    path: PathBuf,
}

impl SmapsSource {
    pub fn new(proc_dir: &Path) -> Self {
        Self {
            path: proc_dir.join("smaps"),
        }
    }
}

impl Default for SmapsSource {
    fn default() -> Self {
        Self::new(Path::new(crate::PROC_SELF))
    }
}

impl RecordSource for SmapsSource {
    fn name(&self) -> &'static str {
        "smaps"
    }

    fn collect(&self, buffer: &mut ProcBuffer) -> Result<PartialRecord, RecordError> {
        let outcome = buffer.read_file(&self.path)?;
        if outcome.truncated {
            warn!(
                "{} filled the {} byte buffer, totals cover only part of the mappings",
                self.path.display(),
                buffer.capacity()
            );
        }

        Ok(parse_smaps(&buffer.text()))
    }
}

/// Sums smaps text into the fields it owns.
pub fn parse_smaps(text: &str) -> PartialRecord {
    let mut partial = PartialRecord::new();
    partial.seed(OWNED_FIELDS);

    let mut matched = 0usize;
    for lv in labeled_values(text) {
        if let Some(&(_, field)) = SMAPS_FIELDS.iter().find(|(label, _)| *label == lv.label) {
            partial.reduce(field, Reducer::Accumulate, lv.value.saturating_mul(1024));
            matched += 1;
        }
    }
    debug!("smaps: summed {} matching lines", matched);
    partial
}
