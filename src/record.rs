//! The memory record: one snapshot of the process's memory accounting.
//!
//! Sources never write into a `MemoryRecord` directly. Each one produces a
//! [`PartialRecord`] by folding its samples with an explicit [`Reducer`], and
//! the recorder merges the partials in a fixed order.

use serde::Serialize;

/// Snapshot of memory counters. Byte quantities except the fault counts.
///
/// A field that no source reported stays at zero; read it as "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryRecord {
    pub major_faults: i64,
    pub minor_faults: i64,
    pub resident_bytes: i64,
    pub proportional_bytes: i64,
    pub page_table_bytes: i64,
    pub virtual_bytes: i64,
    pub swap_bytes: i64,
    pub shared_bytes: i64,
}

const FIELD_COUNT: usize = 8;

/// Tag for each field of a [`MemoryRecord`], in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MajorFaults,
    MinorFaults,
    Resident,
    Proportional,
    Shared,
    PageTable,
    Virtual,
    Swap,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::MajorFaults,
        Field::MinorFaults,
        Field::Resident,
        Field::Proportional,
        Field::Shared,
        Field::PageTable,
        Field::Virtual,
        Field::Swap,
    ];

    /// Human-readable label used by the formatter.
    pub fn label(self) -> &'static str {
        match self {
            Field::MajorFaults => "major page faults",
            Field::MinorFaults => "minor page faults",
            Field::Resident => "Resident Set Size (bytes)",
            Field::Proportional => "Proportional Set Size (bytes)",
            Field::Shared => "Shared (bytes)",
            Field::PageTable => "Page Table Entries (bytes)",
            Field::Virtual => "Virtual Memory Size (bytes)",
            Field::Swap => "Swap (bytes)",
        }
    }

    /// Looks up a field by its display label.
    pub fn from_label(label: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.label() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl MemoryRecord {
    pub fn value(&self, field: Field) -> i64 {
        match field {
            Field::MajorFaults => self.major_faults,
            Field::MinorFaults => self.minor_faults,
            Field::Resident => self.resident_bytes,
            Field::Proportional => self.proportional_bytes,
            Field::Shared => self.shared_bytes,
            Field::PageTable => self.page_table_bytes,
            Field::Virtual => self.virtual_bytes,
            Field::Swap => self.swap_bytes,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut i64 {
        match field {
            Field::MajorFaults => &mut self.major_faults,
            Field::MinorFaults => &mut self.minor_faults,
            Field::Resident => &mut self.resident_bytes,
            Field::Proportional => &mut self.proportional_bytes,
            Field::Shared => &mut self.shared_bytes,
            Field::PageTable => &mut self.page_table_bytes,
            Field::Virtual => &mut self.virtual_bytes,
            Field::Swap => &mut self.swap_bytes,
        }
    }

    /// Per-field change from `earlier` to `self`.
    pub fn delta(&self, earlier: &MemoryRecord) -> MemoryRecord {
        let mut out = MemoryRecord::default();
        for field in Field::ALL {
            *out.slot_mut(field) = self.value(field).saturating_sub(earlier.value(field));
        }
        out
    }

    /// Returns a copy with every field reported by `partial` overwritten.
    pub fn merged(mut self, partial: &PartialRecord) -> MemoryRecord {
        for (field, value) in partial.iter() {
            *self.slot_mut(field) = value;
        }
        self
    }
}

/// How a source combines repeated samples of the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Last sample wins. For sources where each label appears once.
    Assign,
    /// Samples are summed. For sources with one block per mapping.
    Accumulate,
}

impl Reducer {
    pub fn apply(self, slot: &mut Option<i64>, value: i64) {
        *slot = Some(match self {
            Reducer::Assign => value,
            Reducer::Accumulate => slot.unwrap_or(0).saturating_add(value),
        });
    }
}

/// The fields one source reported. Untouched fields are `None` and leave the
/// record unchanged on merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialRecord {
    values: [Option<i64>; FIELD_COUNT],
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `fields` as owned by this source, starting from zero.
    pub fn seed(&mut self, fields: &[Field]) {
        for field in fields {
            self.values[field.index()] = Some(0);
        }
    }

    pub fn reduce(&mut self, field: Field, reducer: Reducer, value: i64) {
        reducer.apply(&mut self.values[field.index()], value);
    }

    pub fn get(&self, field: Field) -> Option<i64> {
        self.values[field.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, i64)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f, v)))
    }
}
