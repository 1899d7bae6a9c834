//! Captures memory records for the current process.
//!
//! Sources run in a fixed order: rusage, then status, then smaps. smaps comes
//! last because its per-mapping sums are more precise than the status
//! counters and must win for every field both report. Reading status and
//! smaps allocates nothing beyond the shared buffer, so the fault counters
//! taken first are not disturbed by the capture itself.

use std::io;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::buffer::ProcBuffer;
use crate::error::RecordError;
use crate::format::write_record;
use crate::process::{RecordSource, RusageSource, SmapsSource, StatusSource};
use crate::record::MemoryRecord;

pub struct Recorder<R = RusageSource, S = StatusSource, M = SmapsSource> {
    rusage: R,
    status: S,
    smaps: M,
    buffer: ProcBuffer,
}

impl Recorder {
    /// Recorder for the calling process with the default buffer size.
    pub fn new() -> Self {
        Self::for_proc_dir(Path::new(crate::PROC_SELF), ProcBuffer::default())
    }

    /// Recorder reading `status` and `smaps` from `proc_dir`.
    pub fn for_proc_dir(proc_dir: &Path, buffer: ProcBuffer) -> Self {
        Self::with_sources(
            RusageSource,
            StatusSource::new(proc_dir),
            SmapsSource::new(proc_dir),
            buffer,
        )
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S, M> Recorder<R, S, M>
where
    R: RecordSource,
    S: RecordSource,
    M: RecordSource,
{
    pub fn with_sources(rusage: R, status: S, smaps: M, buffer: ProcBuffer) -> Self {
        Self {
            rusage,
            status,
            smaps,
            buffer,
        }
    }

    /// Takes one snapshot.
    pub fn capture(&mut self) -> Result<MemoryRecord, RecordError> {
        let start = Instant::now();
        let mut record = MemoryRecord::default();

        for source in [
            &self.rusage as &dyn RecordSource,
            &self.status as &dyn RecordSource,
            &self.smaps as &dyn RecordSource,
        ] {
            let source_start = Instant::now();
            let partial = source.collect(&mut self.buffer)?;
            debug!("{} source in {:?}", source.name(), source_start.elapsed());
            record = record.merged(&partial);
        }

        debug!("captured memory record in {:?}", start.elapsed());
        Ok(record)
    }

    /// Runs the capture and formatting paths once with the output discarded,
    /// so that lazily loaded code and first-touch buffer pages do not show up
    /// as faults in the first real snapshot.
    pub fn warm_up(&mut self) -> Result<(), RecordError> {
        let first = self.capture()?;
        let second = self.capture()?;

        let mut sink = io::sink();
        write_record(&mut sink, None, &first)?;
        write_record(&mut sink, Some(&first), &second)?;
        debug!("recorder warmed up");
        Ok(())
    }

    /// The scratch buffer, for other readers such as the maps summarizer.
    pub fn buffer_mut(&mut self) -> &mut ProcBuffer {
        &mut self.buffer
    }
}
