//! Integration tests for the recorder.
//!
//! These tests point the status and smaps sources at fixture files and check
//! how their values end up in the captured record.

use std::fs;
use std::path::Path;

use herakles_memlab::{
    Field, MemoryRecord, PartialRecord, ProcBuffer, RecordError, RecordSource, Recorder, Reducer,
    RusageSource, SmapsSource, StatusSource,
};

const STATUS: &str = "Name:\tmemlab\n\
    VmPeak:\t   20000 kB\n\
    VmSize:\t   16000 kB\n\
    VmRSS:\t     100 kB\n\
    VmPTE:\t      52 kB\n\
    VmSwap:\t      12 kB\n\
    Threads:\t1\n";

const SMAPS: &str = "555555554000-555555556000 r--p 00000000 08:01 77 /usr/bin/memlab\n\
    Size:                  8 kB\n\
    Rss:                   8 kB\n\
    Pss:                   8 kB\n\
    Shared_Clean:          0 kB\n\
    Shared_Dirty:          0 kB\n\
    Swap:                  0 kB\n\
    VmFlags: rd mr mw me dw sd\n\
    7ffff7dd3000-7ffff7dfc000 r-xp 00000000 08:01 99 /usr/lib/ld-linux-x86-64.so.2\n\
    Size:                164 kB\n\
    Rss:                 192 kB\n\
    Pss:                  40 kB\n\
    Shared_Clean:        160 kB\n\
    Shared_Dirty:          0 kB\n\
    Swap:                  0 kB\n\
    VmFlags: rd ex mr mw me dw sd\n";

fn fixture_dir(status: &str, smaps: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("status"), status).unwrap();
    fs::write(dir.path().join("smaps"), smaps).unwrap();
    dir
}

fn recorder_for(dir: &Path) -> Recorder {
    Recorder::for_proc_dir(dir, ProcBuffer::with_capacity(64 * 1024))
}

#[test]
fn test_smaps_values_win_over_status() {
    let dir = fixture_dir(STATUS, SMAPS);
    let record = recorder_for(dir.path()).capture().unwrap();

    // smaps sums, not VmRSS/VmSize/VmSwap
    assert_eq!(record.resident_bytes, 200 * 1024);
    assert_eq!(record.virtual_bytes, 172 * 1024);
    assert_eq!(record.swap_bytes, 0);
}

#[test]
fn test_status_is_sole_source_of_page_table() {
    let dir = fixture_dir(STATUS, SMAPS);
    let record = recorder_for(dir.path()).capture().unwrap();

    assert_eq!(record.page_table_bytes, 52 * 1024);
}

#[test]
fn test_smaps_is_sole_source_of_pss_and_shared() {
    let dir = fixture_dir(STATUS, SMAPS);
    let record = recorder_for(dir.path()).capture().unwrap();

    assert_eq!(record.proportional_bytes, 48 * 1024);
    assert_eq!(record.shared_bytes, 160 * 1024);
}

#[test]
fn test_empty_smaps_still_overrides_status() {
    let dir = fixture_dir(STATUS, "");
    let record = recorder_for(dir.path()).capture().unwrap();

    assert_eq!(record.resident_bytes, 0);
    assert_eq!(record.virtual_bytes, 0);
    assert_eq!(record.page_table_bytes, 52 * 1024);
}

#[test]
fn test_fault_counters_come_from_rusage() {
    let dir = fixture_dir(STATUS, SMAPS);
    let record = recorder_for(dir.path()).capture().unwrap();

    assert!(record.minor_faults > 0);
}

#[test]
fn test_missing_status_is_environment_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("smaps"), SMAPS).unwrap();

    match recorder_for(dir.path()).capture() {
        Err(RecordError::Open { path, .. }) => assert!(path.ends_with("status")),
        other => panic!("expected open error, got {:?}", other),
    }
}

#[test]
fn test_truncated_smaps_sums_what_fits() {
    let dir = fixture_dir(STATUS, SMAPS);
    let first_block_len = SMAPS.find("7ffff7dd3000").unwrap();
    let mut recorder = Recorder::for_proc_dir(dir.path(), ProcBuffer::with_capacity(first_block_len));

    let record = recorder.capture().unwrap();
    assert_eq!(record.resident_bytes, 8 * 1024);
}

struct Synthetic(&'static [(Field, i64)]);

impl RecordSource for Synthetic {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn collect(&self, _buffer: &mut ProcBuffer) -> Result<PartialRecord, RecordError> {
        let mut partial = PartialRecord::new();
        for &(field, value) in self.0 {
            partial.reduce(field, Reducer::Assign, value);
        }
        Ok(partial)
    }
}

#[test]
fn test_capture_order_with_synthetic_sources() {
    let mut recorder = Recorder::with_sources(
        RusageSource,
        Synthetic(&[(Field::Resident, 100)]),
        Synthetic(&[(Field::Resident, 200)]),
        ProcBuffer::with_capacity(16),
    );

    assert_eq!(recorder.capture().unwrap().resident_bytes, 200);
}

#[test]
fn test_real_sources_against_proc_self() {
    let mut buffer = ProcBuffer::default();
    let status = StatusSource::default().collect(&mut buffer).unwrap();
    let smaps = SmapsSource::default().collect(&mut buffer).unwrap();

    assert!(status.get(Field::Resident).unwrap() > 0);
    assert!(smaps.get(Field::Resident).unwrap() > 0);
    assert!(smaps.get(Field::PageTable).is_none());
}

#[test]
fn test_two_live_snapshots_diff() {
    let mut recorder = Recorder::new();
    recorder.warm_up().unwrap();
    let before = recorder.capture().unwrap();

    let pages = vec![7u8; 8 * 1024 * 1024];
    let after = recorder.capture().unwrap();
    drop(pages);

    let delta = after.delta(&before);
    assert!(delta.minor_faults >= 0);
    assert_ne!(after, MemoryRecord::default());
}
