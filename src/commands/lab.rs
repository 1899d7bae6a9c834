//! Lab command implementation.
//!
//! Prints the address-space layout, takes a snapshot, runs one page-fault
//! scenario, takes a second snapshot and prints it with deltas.

use std::alloc::{self, Layout};
use std::io::{self, Write};
use std::ptr::NonNull;

use herakles_memlab::{write_record, MapsSummarizer, Recorder};
use tracing::{debug, info, warn};

use crate::config::Config;

const PAGE_SIZE: usize = 4096;

#[repr(C, align(4096))]
struct PageAligned([u8; PAGE_SIZE * 32]);

/// Zero-initialized, so its pages are not resident until first written.
static mut GLOBAL_ARRAY: PageAligned = PageAligned([0; PAGE_SIZE * 32]);

/// Page-fault patterns the lab can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Idle,
    GlobalArray,
    HeapSparse,
    HeapStrided,
    FixedMappingLow,
    FixedMappingHigh,
}

impl TryFrom<u8> for Scenario {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Ok(match n {
            0 => Scenario::Idle,
            1 => Scenario::GlobalArray,
            2 => Scenario::HeapSparse,
            3 => Scenario::HeapStrided,
            4 => Scenario::FixedMappingLow,
            5 => Scenario::FixedMappingHigh,
            other => return Err(format!("unknown scenario {}", other)),
        })
    }
}

impl Scenario {
    pub fn describe(self) -> &'static str {
        match self {
            Scenario::Idle => "do nothing",
            Scenario::GlobalArray => "write two bytes into the second page of a static array",
            Scenario::HeapSparse => "allocate 1,000,000 bytes and touch two ints",
            Scenario::HeapStrided => "allocate 1 MiB - 3520 bytes and touch 32 ints one page apart",
            Scenario::FixedMappingLow => "map one anonymous page at 0x5555557bc000 and touch it",
            Scenario::FixedMappingHigh => "map one anonymous page at 0x5655555bc000 and touch it",
        }
    }

    /// Runs the scenario. The returned footprint keeps allocations alive
    /// until it is dropped.
    pub fn run(self) -> io::Result<Footprint> {
        match self {
            Scenario::Idle => Ok(Footprint::Nothing),
            Scenario::GlobalArray => {
                // SAFETY: single-threaded driver; both offsets are inside the
                // array and no reference to the static exists.
                unsafe {
                    let base = std::ptr::addr_of_mut!(GLOBAL_ARRAY).cast::<u8>();
                    base.add(PAGE_SIZE + 1).write_volatile(0);
                    base.add(PAGE_SIZE + 2).write_volatile(0);
                }
                Ok(Footprint::Nothing)
            }
            Scenario::HeapSparse => {
                let block = HeapBlock::new(1_000_000)?;
                block.touch_int(0);
                block.touch_int(10_000);
                Ok(Footprint::Heap(block))
            }
            Scenario::HeapStrided => {
                let block = HeapBlock::new(1_048_576 - 3520)?;
                for i in 0..32 {
                    block.touch_int(i * 4092 + 1);
                }
                Ok(Footprint::Heap(block))
            }
            Scenario::FixedMappingLow => FixedMapping::new(0x5555_557B_C000).map(Footprint::Mapping),
            Scenario::FixedMappingHigh => FixedMapping::new(0x5655_555B_C000).map(Footprint::Mapping),
        }
    }
}

/// Memory a scenario left behind.
#[allow(dead_code)] // Held only to be dropped after the second snapshot
pub enum Footprint {
    Nothing,
    Heap(HeapBlock),
    Mapping(FixedMapping),
}

/// Uninitialized heap allocation, so pages are faulted in only when touched.
pub struct HeapBlock {
    ptr: NonNull<i32>,
    layout: Layout,
}

impl HeapBlock {
    fn new(size: usize) -> io::Result<Self> {
        let layout = Layout::from_size_align(size, std::mem::align_of::<i32>())
            .map_err(io::Error::other)?;
        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<i32>())
            .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "allocation failed"))?;
        debug!("allocated {} bytes at {:p}", size, ptr);
        Ok(Self { ptr, layout })
    }

    fn touch_int(&self, index: usize) {
        debug_assert!((index + 1) * std::mem::size_of::<i32>() <= self.layout.size());
        // SAFETY: callers pass constant indices inside the allocation
        unsafe { self.ptr.as_ptr().add(index).write_volatile(1) };
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        // SAFETY: allocated in HeapBlock::new with the same layout
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), self.layout) };
    }
}

/// One anonymous private page mapped at a fixed address.
pub struct FixedMapping {
    addr: NonNull<u8>,
}

impl FixedMapping {
    fn new(hint: usize) -> io::Result<Self> {
        // SAFETY: MAP_FIXED_NOREPLACE never replaces an existing mapping; the
        // call fails with EEXIST instead.
        let raw = unsafe {
            libc::mmap(
                hint as *mut libc::c_void,
                PAGE_SIZE,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_FIXED_NOREPLACE,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        if raw as usize != hint {
            // Kernels before 4.17 treat the flag as a plain hint
            warn!("requested mapping at {:#x}, kernel placed it at {:p}", hint, raw);
        }

        let addr = NonNull::new(raw.cast::<u8>())
            .ok_or_else(|| io::Error::other("mmap returned a null mapping"))?;
        // SAFETY: the page is mapped read/write and owned by this value
        unsafe { addr.as_ptr().add(1).write_volatile(0) };
        Ok(Self { addr })
    }

    pub fn addr(&self) -> usize {
        self.addr.as_ptr() as usize
    }
}

impl Drop for FixedMapping {
    fn drop(&mut self) {
        // SAFETY: unmaps exactly the page mapped in FixedMapping::new
        unsafe { libc::munmap(self.addr.as_ptr().cast(), PAGE_SIZE) };
    }
}

/// Runs a lab scenario between two snapshots.
pub fn command_lab(
    scenario: u8,
    print_maps: bool,
    config: &Config,
    recorder: &mut Recorder,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::try_from(scenario)?;
    let maps = MapsSummarizer::new(&config.proc_dir()).with_anonymous_label(config.anonymous_label());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if print_maps {
        writeln!(out, "Memory layout:")?;
        maps.print(&mut out, recorder.buffer_mut())?;
        writeln!(out)?;
    }

    writeln!(out, "Initial state:")?;
    if config.warm_up.unwrap_or(true) {
        recorder.warm_up()?;
    }
    let before = recorder.capture()?;
    write_record(&mut out, None, &before)?;
    writeln!(out, "---")?;

    writeln!(out, "Running scenario {} ({})...", scenario as u8, scenario.describe())?;
    out.flush()?;
    info!("running lab scenario {:?}", scenario);
    let footprint = scenario.run()?;
    if let Footprint::Mapping(mapping) = &footprint {
        debug!("scenario page mapped at {:#x}", mapping.addr());
    }

    writeln!(out, "---")?;
    writeln!(out, "Afterwards:")?;
    let after = recorder.capture()?;
    write_record(&mut out, Some(&before), &after)?;

    if print_maps {
        maps.print(&mut out, recorder.buffer_mut())?;
    }
    drop(footprint);
    Ok(())
}
