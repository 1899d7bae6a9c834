//! Page fault counters from `getrusage(RUSAGE_SELF)`.

use nix::sys::resource::{getrusage, UsageWho};

use super::RecordSource;
use crate::buffer::ProcBuffer;
use crate::error::RecordError;
use crate::record::{Field, PartialRecord, Reducer};

/// Reports minor and major fault counts. Does not touch the buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RusageSource;

impl RecordSource for RusageSource {
    fn name(&self) -> &'static str {
        "rusage"
    }

    fn collect(&self, _buffer: &mut ProcBuffer) -> Result<PartialRecord, RecordError> {
        let usage = getrusage(UsageWho::RUSAGE_SELF)?;

        let mut partial = PartialRecord::new();
        partial.reduce(Field::MinorFaults, Reducer::Assign, usage.minor_page_faults() as i64);
        partial.reduce(Field::MajorFaults, Reducer::Assign, usage.major_page_faults() as i64);
        Ok(partial)
    }
}
