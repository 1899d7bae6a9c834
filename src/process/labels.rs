//! `label: value` line scanner shared by the status and smaps parsers.

/// Labels longer than this are rejected rather than cut short.
pub const MAX_LABEL_LEN: usize = 32;

/// One `label: value` pair borrowed from a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledValue<'a> {
    pub label: &'a str,
    pub value: i64,
}

/// Extracts `label: value` from a line such as `VmRSS:     1234 kB`.
///
/// Anything after the number (units, flags) is ignored. Lines without a
/// colon, with an empty or oversized label, or without a number after the
/// colon yield `None`; callers skip them.
pub fn parse_labeled_value(line: &str) -> Option<LabeledValue<'_>> {
    let (raw_label, rest) = line.split_once(':')?;
    let label = raw_label.trim();
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return None;
    }

    let value = parse_leading_i64(rest.trim_start())?;
    Some(LabeledValue { label, value })
}

/// Parses an optionally signed decimal prefix, e.g. `-12 kB` -> -12.
fn parse_leading_i64(s: &str) -> Option<i64> {
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Splits text into lines and yields the ones that parse.
pub fn labeled_values(text: &str) -> impl Iterator<Item = LabeledValue<'_>> {
    text.lines().filter_map(parse_labeled_value)
}
