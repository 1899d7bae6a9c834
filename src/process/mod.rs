//! Sources that fill a memory record for the current process.
//!
//! This module provides:
//! - `labels`: `label: value` line scanning
//! - `status`: coarse counters from /proc/self/status
//! - `smaps`: per-mapping counters from /proc/self/smaps, summed
//! - `rusage`: page fault counters from getrusage()

pub mod labels;
pub mod rusage;
pub mod smaps;
pub mod status;

use crate::buffer::ProcBuffer;
use crate::error::RecordError;
use crate::record::PartialRecord;

/// Anything that can report some fields of a memory record.
///
/// Sources get the shared scratch buffer for their reads and return only the
/// fields they own; the recorder decides the merge order.
pub trait RecordSource {
    fn name(&self) -> &'static str;

    fn collect(&self, buffer: &mut ProcBuffer) -> Result<PartialRecord, RecordError>;
}

// Re-export commonly used types
pub use labels::{labeled_values, parse_labeled_value, LabeledValue, MAX_LABEL_LEN};
pub use rusage::RusageSource;
pub use smaps::SmapsSource;
pub use status::StatusSource;
