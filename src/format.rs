//! Fixed-width text rendering of memory records.
//!
//! ```text
//!              major page faults:          0
//!              minor page faults:        912 (       +35)
//! ```

use std::io::Write;

use crate::error::RecordError;
use crate::record::{Field, MemoryRecord};

pub const LABEL_WIDTH: usize = 30;
pub const VALUE_WIDTH: usize = 10;

/// Writes one line per field of `to`. With `from`, each line also carries
/// the signed change `to - from`.
pub fn write_record<W: Write + ?Sized>(
    out: &mut W,
    from: Option<&MemoryRecord>,
    to: &MemoryRecord,
) -> Result<(), RecordError> {
    for field in Field::ALL {
        let value = to.value(field);
        match from {
            None => writeln!(
                out,
                "{:>lw$}: {:>vw$}",
                field.label(),
                value,
                lw = LABEL_WIDTH,
                vw = VALUE_WIDTH
            )?,
            Some(from) => writeln!(
                out,
                "{:>lw$}: {:>vw$} ({:>+vw$})",
                field.label(),
                value,
                value.saturating_sub(from.value(field)),
                lw = LABEL_WIDTH,
                vw = VALUE_WIDTH
            )?,
        }
    }
    Ok(())
}

/// Renders a record into a `String`.
pub fn format_record(from: Option<&MemoryRecord>, to: &MemoryRecord) -> String {
    let mut out = Vec::new();
    write_record(&mut out, from, to).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&out).into_owned()
}
