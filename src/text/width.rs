//! Display-width measurement.
//!
//! Every wrap and cursor decision in the crate measures terminal columns,
//! never `char` counts, so CJK and other double-width glyphs take two cells.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns occupied by one character. Control characters count as zero.
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Columns occupied by a string.
pub fn str_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Width of the widest line of a multi-line string.
pub fn widest_line(s: &str) -> usize {
    s.lines().map(str_width).max().unwrap_or(0)
}

/// Longest prefix of `s` that fits in `max` columns.
pub fn truncate_to_width(s: &str, max: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = char_width(c);
        if used + w > max {
            return &s[..idx];
        }
        used += w;
    }
    s
}
