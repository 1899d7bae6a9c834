//! Bounded reads of small pseudo-files.
//!
//! Files under `/proc/self` report a size of zero and must be read until the
//! kernel returns end-of-stream. `ProcBuffer` reads them into a fixed-capacity
//! buffer that is reused across reads instead of growing. When the buffer
//! fills up the content is cut off and the outcome is flagged as truncated;
//! the caller decides how loudly to complain.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::RecordError;

/// Default scratch capacity: 512 KiB.
pub const DEFAULT_BUFFER_KB: usize = 512;

/// Result of a single bounded read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Number of bytes now held in the buffer.
    pub bytes: usize,
    /// The buffer filled up before end-of-stream was seen.
    pub truncated: bool,
}

/// Caller-owned scratch buffer for pseudo-file contents.
///
/// Every read overwrites the previous contents. Slices returned by
/// [`ProcBuffer::contents`] and [`ProcBuffer::text`] borrow the buffer, so
/// they cannot outlive the next read.
pub struct ProcBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl ProcBuffer {
    /// Creates a buffer holding at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Creates a buffer sized in kilobytes, as configured.
    pub fn with_capacity_kb(kb: usize) -> Self {
        Self::with_capacity(kb * 1024)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Reads the whole file at `path`, up to the buffer capacity.
    pub fn read_file(&mut self, path: &Path) -> Result<ReadOutcome, RecordError> {
        let file = File::open(path).map_err(|source| RecordError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.fill_from(file).map_err(|source| RecordError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads from `reader` until end-of-stream or until the buffer is full.
    pub fn fill_from<R: Read>(&mut self, mut reader: R) -> std::io::Result<ReadOutcome> {
        self.len = 0;
        while self.len < self.data.len() {
            match reader.read(&mut self.data[self.len..]) {
                Ok(0) => break,
                Ok(n) => self.len += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(ReadOutcome {
            bytes: self.len,
            truncated: self.len == self.data.len(),
        })
    }

    /// Bytes filled by the last read.
    pub fn contents(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Contents of the last read as text. Procfs output is ASCII except for
    /// path names, which are replaced lossily if they are not valid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.contents())
    }
}

impl Default for ProcBuffer {
    fn default() -> Self {
        Self::with_capacity_kb(DEFAULT_BUFFER_KB)
    }
}
