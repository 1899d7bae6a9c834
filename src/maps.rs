//! Address-space summary from `/proc/self/maps`.
//!
//! Raw mappings are filtered and coalesced into [`MappedRegion`]s: adjacent
//! entries with the same backing name and no gap between them become one
//! region. Inaccessible entries (neither readable nor writable, e.g. guard
//! pages) are dropped.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::buffer::ProcBuffer;
use crate::error::{MapsLineError, RecordError};

/// Name given to mappings without a backing path.
pub const ANONYMOUS_MAPPING: &str = "[dynamic allocation]";

/// Permission flags of a raw mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    pub shared: bool,
}

impl Permissions {
    fn parse(s: &str) -> Result<Self, MapsLineError> {
        let b = s.as_bytes();
        if b.len() != 4 {
            return Err(MapsLineError::InvalidPermissions(s.to_string()));
        }
        Ok(Self {
            read: b[0] == b'r',
            write: b[1] == b'w',
            execute: b[2] == b'x',
            shared: b[3] == b's',
        })
    }

    pub fn is_accessible(&self) -> bool {
        self.read || self.write
    }
}

/// One line of the maps file. `end` is exclusive; `name` is `None` for
/// anonymous mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMapping {
    pub start: u64,
    pub end: u64,
    pub perms: Permissions,
    pub name: Option<String>,
}

/// A coalesced run of contiguous mappings sharing one backing name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRegion {
    pub start: u64,
    pub end_inclusive: u64,
    pub name: String,
}

/// Parses `start-end perms offset dev inode [pathname]`.
///
/// Only the first whitespace-separated token of the pathname is kept.
pub fn parse_maps_line(line: &str) -> Result<RawMapping, MapsLineError> {
    let mut tokens = line.split_whitespace();

    let range = tokens.next().ok_or(MapsLineError::MissingField("address"))?;
    let perms = tokens.next().ok_or(MapsLineError::MissingField("perms"))?;
    let offset = tokens.next().ok_or(MapsLineError::MissingField("offset"))?;
    let device = tokens.next().ok_or(MapsLineError::MissingField("device"))?;
    let inode = tokens.next().ok_or(MapsLineError::MissingField("inode"))?;
    let name = tokens.next().map(str::to_string);

    let (start, end) = range
        .split_once('-')
        .and_then(|(s, e)| {
            Some((
                u64::from_str_radix(s, 16).ok()?,
                u64::from_str_radix(e, 16).ok()?,
            ))
        })
        .ok_or_else(|| MapsLineError::InvalidAddress(range.to_string()))?;
    let perms = Permissions::parse(perms)?;

    if u64::from_str_radix(offset, 16).is_err() {
        return Err(MapsLineError::InvalidField("offset", offset.to_string()));
    }
    let valid_device = device.split_once(':').is_some_and(|(major, minor)| {
        u32::from_str_radix(major, 16).is_ok() && u32::from_str_radix(minor, 16).is_ok()
    });
    if !valid_device {
        return Err(MapsLineError::InvalidField("device", device.to_string()));
    }
    if inode.parse::<u64>().is_err() {
        return Err(MapsLineError::InvalidField("inode", inode.to_string()));
    }

    Ok(RawMapping {
        start,
        end,
        perms,
        name,
    })
}

/// Accumulates raw mappings into coalesced regions, in file order.
#[derive(Debug, Default)]
pub struct Coalescer {
    current: Option<(u64, u64, String)>,
    regions: Vec<MappedRegion>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one accessible, named entry. `end` is exclusive.
    pub fn push(&mut self, start: u64, end: u64, name: &str) {
        if let Some((_, cur_end, cur_name)) = self.current.as_mut() {
            if cur_name.as_str() == name && *cur_end == start {
                *cur_end = end;
                return;
            }
        }
        self.flush();
        self.current = Some((start, end, name.to_string()));
    }

    fn flush(&mut self) {
        if let Some((start, end, name)) = self.current.take() {
            self.regions.push(MappedRegion {
                start,
                end_inclusive: end.saturating_sub(1),
                name,
            });
        }
    }

    pub fn finish(mut self) -> Vec<MappedRegion> {
        self.flush();
        self.regions
    }
}

/// Filters and coalesces maps text. Malformed lines are logged and skipped.
pub fn summarize(text: &str, anonymous_label: &str) -> Vec<MappedRegion> {
    let mut coalescer = Coalescer::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let mapping = match parse_maps_line(line) {
            Ok(m) => m,
            Err(e) => {
                warn!("error parsing '{}' in maps: {}", line, e);
                continue;
            }
        };
        if !mapping.perms.is_accessible() {
            debug!("skipping inaccessible mapping {:x}-{:x}", mapping.start, mapping.end);
            continue;
        }
        let name = mapping.name.as_deref().unwrap_or(anonymous_label);
        coalescer.push(mapping.start, mapping.end, name);
    }
    coalescer.finish()
}

/// Writes the two-column region table.
pub fn write_regions<W: Write + ?Sized>(
    out: &mut W,
    regions: &[MappedRegion],
) -> Result<(), RecordError> {
    writeln!(out, "{:<25} {}", "addresses", "usage")?;
    writeln!(out, "{:<25} {}", "---------", "-----")?;
    for region in regions {
        writeln!(
            out,
            "{:012x}-{:012x} {}",
            region.start, region.end_inclusive, region.name
        )?;
    }
    Ok(())
}

/// Reads a maps file and prints its summary.
pub struct MapsSummarizer {
    path: PathBuf,
    anonymous_label: String,
}

impl MapsSummarizer {
    pub fn new(proc_dir: &Path) -> Self {
        Self {
            path: proc_dir.join("maps"),
            anonymous_label: ANONYMOUS_MAPPING.to_string(),
        }
    }

    pub fn with_anonymous_label(mut self, label: impl Into<String>) -> Self {
        self.anonymous_label = label.into();
        self
    }

    pub fn regions(&self, buffer: &mut ProcBuffer) -> Result<Vec<MappedRegion>, RecordError> {
        let outcome = buffer.read_file(&self.path)?;
        if outcome.truncated {
            warn!(
                "{} filled the {} byte buffer, layout is incomplete",
                self.path.display(),
                buffer.capacity()
            );
        }
        Ok(summarize(&buffer.text(), &self.anonymous_label))
    }

    pub fn print<W: Write + ?Sized>(
        &self,
        out: &mut W,
        buffer: &mut ProcBuffer,
    ) -> Result<(), RecordError> {
        let regions = self.regions(buffer)?;
        write_regions(out, &regions)
    }
}

impl Default for MapsSummarizer {
    fn default() -> Self {
        Self::new(Path::new(crate::PROC_SELF))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(start: u64, end_inclusive: u64, name: &str) -> MappedRegion {
        MappedRegion {
            start,
            end_inclusive,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_file_backed_line() {
        let m = parse_maps_line(
            "7f1c2a400000-7f1c2a428000 r--p 00000000 08:01 1835023    /usr/lib/x86_64-linux-gnu/libc.so.6",
        )
        .unwrap();

        assert_eq!(m.start, 0x7f1c2a400000);
        assert_eq!(m.end, 0x7f1c2a428000);
        assert!(m.perms.read && !m.perms.write && !m.perms.execute && !m.perms.shared);
        assert_eq!(m.name.as_deref(), Some("/usr/lib/x86_64-linux-gnu/libc.so.6"));
    }

    #[test]
    fn test_parse_anonymous_line() {
        let m = parse_maps_line("7f1c2a3fd000-7f1c2a400000 rw-p 00000000 00:00 0 ").unwrap();
        assert_eq!(m.name, None);
        assert!(m.perms.write);
    }

    #[test]
    fn test_parse_keeps_first_name_token() {
        let m = parse_maps_line("1000-2000 r--s 00000000 00:05 7 /dev/shm/a b (deleted)").unwrap();
        assert_eq!(m.name.as_deref(), Some("/dev/shm/a"));
        assert!(m.perms.shared);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_maps_line("1000-2000 r--p 00000000"),
            Err(MapsLineError::MissingField("device"))
        );
        assert_eq!(
            parse_maps_line("zz-2000 r--p 0 00:00 0"),
            Err(MapsLineError::InvalidAddress("zz-2000".to_string()))
        );
        assert_eq!(
            parse_maps_line("1000 r--p 0 00:00 0"),
            Err(MapsLineError::InvalidAddress("1000".to_string()))
        );
        assert_eq!(
            parse_maps_line("1000-2000 r-p 0 00:00 0"),
            Err(MapsLineError::InvalidPermissions("r-p".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_offset_device_inode() {
        assert_eq!(
            parse_maps_line("1000-2000 rw-p zzzz nodev notanumber /x"),
            Err(MapsLineError::InvalidField("offset", "zzzz".to_string()))
        );
        assert_eq!(
            parse_maps_line("1000-2000 rw-p 0 nodev 0 /x"),
            Err(MapsLineError::InvalidField("device", "nodev".to_string()))
        );
        assert_eq!(
            parse_maps_line("1000-2000 rw-p 0 08:zz 0 /x"),
            Err(MapsLineError::InvalidField("device", "08:zz".to_string()))
        );
        assert_eq!(
            parse_maps_line("1000-2000 rw-p 0 08:01 1f /x"),
            Err(MapsLineError::InvalidField("inode", "1f".to_string()))
        );
        assert!(parse_maps_line("1000-2000 rw-p 0000a000 fd:01 42 /x").is_ok());
    }

    #[test]
    fn test_summarize_skips_line_with_bad_inode() {
        let text = "1000-2000 rw-p 0 00:00 x A\n2000-3000 rw-p 0 00:00 0 B\n";
        assert_eq!(summarize(text, ANONYMOUS_MAPPING), vec![region(0x2000, 0x2fff, "B")]);
    }

    #[test]
    fn test_coalescer_merges_contiguous_same_name() {
        let mut c = Coalescer::new();
        c.push(0x1000, 0x2000, "A");
        c.push(0x2000, 0x3000, "A");
        assert_eq!(c.finish(), vec![region(0x1000, 0x2fff, "A")]);
    }

    #[test]
    fn test_coalescer_splits_on_gap() {
        let mut c = Coalescer::new();
        c.push(0x1000, 0x2000, "A");
        c.push(0x3000, 0x4000, "A");
        assert_eq!(
            c.finish(),
            vec![region(0x1000, 0x1fff, "A"), region(0x3000, 0x3fff, "A")]
        );
    }

    #[test]
    fn test_coalescer_splits_on_name() {
        let mut c = Coalescer::new();
        c.push(0x1000, 0x2000, "A");
        c.push(0x2000, 0x3000, "B");
        assert_eq!(
            c.finish(),
            vec![region(0x1000, 0x1fff, "A"), region(0x2000, 0x2fff, "B")]
        );
    }

    #[test]
    fn test_coalescer_empty() {
        assert!(Coalescer::new().finish().is_empty());
    }

    #[test]
    fn test_guard_pages_are_dropped() {
        let text = "1000-2000 r--p 00000000 08:01 5 /bin/a\n\
                    2000-3000 ---p 00000000 08:01 5 /bin/a\n\
                    3000-4000 r--p 00000000 08:01 5 /bin/a\n";
        assert_eq!(
            summarize(text, ANONYMOUS_MAPPING),
            vec![region(0x1000, 0x1fff, "/bin/a"), region(0x3000, 0x3fff, "/bin/a")]
        );
    }

    #[test]
    fn test_write_only_mapping_is_kept() {
        let text = "1000-2000 -w-p 00000000 00:00 0\n";
        assert_eq!(summarize(text, ANONYMOUS_MAPPING).len(), 1);
    }

    #[test]
    fn test_anonymous_mapping_gets_placeholder() {
        let text = "1000-2000 rw-p 00000000 00:00 0\n";
        assert_eq!(
            summarize(text, ANONYMOUS_MAPPING),
            vec![region(0x1000, 0x1fff, ANONYMOUS_MAPPING)]
        );
        assert_eq!(summarize(text, "[anon]")[0].name, "[anon]");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "garbage\n\n1000-2000 rw-p 00000000 00:00 0 [heap]\n";
        assert_eq!(summarize(text, ANONYMOUS_MAPPING), vec![region(0x1000, 0x1fff, "[heap]")]);
    }

    #[test]
    fn test_write_regions_table() {
        let mut out = Vec::new();
        write_regions(
            &mut out,
            &[region(0x55d0c0000000, 0x55d0c0005fff, "/usr/bin/cat")],
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "addresses                 usage\n\
             ---------                 -----\n\
             55d0c0000000-55d0c0005fff /usr/bin/cat\n"
        );
    }
}
