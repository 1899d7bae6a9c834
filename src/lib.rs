//! Herakles Memory Lab Library
//!
//! Point-in-time memory snapshots of the calling process, read from the
//! kernel's textual interfaces, plus a coalesced view of its address space.
//!
//! # Features
//!
//! - **Fault counters**: minor and major page faults from `getrusage`
//! - **Memory accounting**: RSS, PSS, shared, page-table, virtual and swap bytes
//!   from `/proc/self/status` and `/proc/self/smaps`
//! - **Deltas**: fixed-width dump of one record or of the change between two
//! - **Address-space layout**: `/proc/self/maps` with contiguous same-name
//!   entries merged
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_memlab::{format_record, MapsSummarizer, Recorder};
//!
//! let mut recorder = Recorder::new();
//! recorder.warm_up()?;
//!
//! let before = recorder.capture()?;
//! let data = vec![1u8; 1 << 20];
//! let after = recorder.capture()?;
//! drop(data);
//!
//! print!("{}", format_record(Some(&before), &after));
//!
//! let maps = MapsSummarizer::default();
//! maps.print(&mut std::io::stdout(), recorder.buffer_mut())?;
//! # Ok::<(), herakles_memlab::RecordError>(())
//! ```

pub mod buffer;
pub mod error;
pub mod format;
pub mod maps;
pub mod process;
pub mod record;
pub mod recorder;

/// Directory the sources read from by default.
pub const PROC_SELF: &str = "/proc/self";

// Re-export main types for convenience
pub use buffer::{ProcBuffer, ReadOutcome, DEFAULT_BUFFER_KB};
pub use error::{MapsLineError, RecordError};
pub use format::{format_record, write_record};
pub use maps::{
    parse_maps_line, summarize, write_regions, MappedRegion, MapsSummarizer, RawMapping,
    ANONYMOUS_MAPPING,
};
pub use process::{RecordSource, RusageSource, SmapsSource, StatusSource};
pub use record::{Field, MemoryRecord, PartialRecord, Reducer};
pub use recorder::Recorder;
