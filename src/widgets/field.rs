//! Single-line edit buffer with a horizontal scroll window.
//!
//! Three numbers describe what is on screen:
//!
//! - `pos`: cursor index into the buffer
//! - `xdraw`: index of the first visible character
//! - `xcursor`: cursor column inside the field
//!
//! and after every operation `xdraw <= pos <= len <= max_len`,
//! `xcursor` equals the width of `buf[xdraw..pos]` and `xcursor < cols`.
//! Widths are the widths of what is displayed, so a masked field scrolls by
//! mask glyphs, not by the hidden characters.

use crate::dialog::Mask;
use crate::error::DialogError;
use crate::text::char_width;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFlags {
    /// Show the mask instead of the input.
    pub secure: bool,
    pub readonly: bool,
    /// Widen to the remaining form width on every layout.
    pub extend: bool,
    /// Put the cursor after the last character on every layout.
    pub cursor_end: bool,
    /// Accept ASCII only.
    pub single_byte: bool,
    /// Draw without the field colors.
    pub no_color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    buf: Vec<char>,
    max_len: usize,
    cols: usize,
    pos: usize,
    xdraw: usize,
    xcursor: usize,
    flags: FieldFlags,
    mask: Mask,
}

impl Field {
    pub fn new(init: &str, cols: u16, max_len: usize, flags: FieldFlags, mask: Mask) -> Result<Self, DialogError> {
        if cols == 0 {
            return Err(DialogError::config("field width must be positive"));
        }
        if max_len == 0 {
            return Err(DialogError::config("field maximum length must be positive"));
        }
        let buf: Vec<char> = init.chars().collect();
        if buf.len() > max_len {
            return Err(DialogError::config(format!(
                "initial value has {} characters, field allows {max_len}",
                buf.len()
            )));
        }
        let mask = match mask {
            Mask::Glyph(c) if char_width(c) == 0 => Mask::Hidden,
            other => other,
        };
        Ok(Self {
            buf,
            max_len,
            cols: usize::from(cols),
            pos: 0,
            xdraw: 0,
            xcursor: 0,
            flags,
            mask,
        })
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Index of the first visible character.
    pub fn scroll(&self) -> usize {
        self.xdraw
    }

    /// Cursor column inside the field.
    pub fn cursor_col(&self) -> usize {
        self.xcursor
    }

    /// The real input.
    pub fn value(&self) -> String {
        self.buf.iter().collect()
    }

    /// What the user sees in place of `c`.
    pub fn public_char(&self, c: char) -> Option<char> {
        if !self.flags.secure {
            return Some(c);
        }
        match self.mask {
            Mask::Glyph(g) => Some(g),
            Mask::Hidden => None,
        }
    }

    /// The displayed form of the whole buffer.
    pub fn public_buffer(&self) -> String {
        self.buf.iter().filter_map(|&c| self.public_char(c)).collect()
    }

    /// Visible slice of the displayed buffer.
    pub fn visible(&self) -> String {
        let mut used = 0;
        let mut out = String::new();
        for &c in &self.buf[self.xdraw..] {
            let Some(shown) = self.public_char(c) else {
                continue;
            };
            let w = char_width(shown);
            if used + w > self.cols {
                break;
            }
            used += w;
            out.push(shown);
        }
        out
    }

    fn width_at(&self, index: usize) -> usize {
        self.public_char(self.buf[index]).map_or(0, char_width)
    }

    /// Change the visible width, keeping the cursor on the same character.
    pub fn set_cols(&mut self, cols: u16) {
        let cols = usize::from(cols.max(1));
        if cols == self.cols {
            return;
        }
        self.cols = cols;
        let pos = self.pos;
        self.home();
        while self.pos < pos && self.move_right() {}
    }

    pub fn move_left(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        if self.pos < self.xdraw {
            self.xdraw = self.pos;
            self.xcursor = 0;
        } else {
            self.xcursor -= self.width_at(self.pos);
        }
        // keep some context to the left of the cursor
        while self.xdraw > 0 && self.xcursor < self.cols / 2 {
            let w = self.width_at(self.xdraw - 1);
            if self.xcursor + w >= self.cols {
                break;
            }
            self.xdraw -= 1;
            self.xcursor += w;
        }
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.pos == self.buf.len() {
            return false;
        }
        let old_w = self.width_at(self.pos);
        self.pos += 1;
        let next_w = if self.pos < self.buf.len() {
            self.width_at(self.pos).max(1)
        } else {
            1
        };
        if self.xcursor + old_w + next_w > self.cols {
            let mut used = next_w;
            self.xdraw = self.pos;
            while self.xdraw > 0 {
                let w = self.width_at(self.xdraw - 1);
                if used + w > self.cols {
                    break;
                }
                self.xdraw -= 1;
                used += w;
            }
            self.xcursor = used.saturating_sub(next_w);
        } else {
            self.xcursor += old_w;
        }
        true
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.flags.readonly || self.pos == self.buf.len() {
            return false;
        }
        self.buf.remove(self.pos);
        true
    }

    /// Insert before the cursor and step over the new character.
    pub fn insert(&mut self, c: char) -> bool {
        if self.flags.readonly || self.buf.len() >= self.max_len || c.is_control() {
            return false;
        }
        if self.flags.single_byte && !c.is_ascii() {
            return false;
        }
        self.buf.insert(self.pos, c);
        self.move_right();
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.flags.readonly || !self.move_left() {
            return false;
        }
        self.delete()
    }

    pub fn home(&mut self) -> bool {
        let moved = self.pos != 0 || self.xdraw != 0;
        self.pos = 0;
        self.xdraw = 0;
        self.xcursor = 0;
        moved
    }

    pub fn end(&mut self) -> bool {
        let mut moved = false;
        while self.move_right() {
            moved = true;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(cols: u16, max_len: usize) -> Field {
        Field::new("", cols, max_len, FieldFlags::default(), Mask::default()).expect("valid field")
    }

    fn check_invariant(f: &Field) {
        assert!(f.scroll() <= f.pos());
        assert!(f.pos() <= f.len());
        assert!(f.len() <= f.max_len());
        assert!(f.cursor_col() < f.cols().max(1));
        let width: usize = (f.scroll()..f.pos()).map(|i| f.width_at(i)).sum();
        assert_eq!(f.cursor_col(), width);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let flags = FieldFlags::default();
        assert!(Field::new("", 0, 5, flags, Mask::default()).is_err());
        assert!(Field::new("", 5, 0, flags, Mask::default()).is_err());
        assert!(Field::new("abcdef", 5, 3, flags, Mask::default()).is_err());
    }

    #[test]
    fn test_insert_at_width_boundary_scrolls_by_one() {
        let mut f = field(5, 10);
        for c in "abcde".chars() {
            assert!(f.insert(c));
            check_invariant(&f);
        }
        let before = f.scroll();
        assert!(f.insert('f'));
        assert_eq!(f.len(), 6);
        assert_eq!(f.scroll(), before + 1);
        assert!(f.cursor_col() <= 4);
        check_invariant(&f);
        assert_eq!(f.visible(), "cdef");
    }

    #[test]
    fn test_wide_glyphs_scroll_by_their_width() {
        let mut f = field(6, 10);
        for c in "日本語".chars() {
            f.insert(c);
            check_invariant(&f);
        }
        // three wide glyphs plus the cursor cell do not fit in six columns
        assert_eq!(f.scroll(), 1);
        assert_eq!(f.cursor_col(), 4);
        assert_eq!(f.visible(), "本語");
    }

    #[test]
    fn test_max_len_stops_input() {
        let mut f = field(10, 3);
        assert!(f.insert('a'));
        assert!(f.insert('b'));
        assert!(f.insert('c'));
        assert!(!f.insert('d'));
        assert_eq!(f.value(), "abc");
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut f = Field::new("hello", 10, 20, FieldFlags::default(), Mask::default()).expect("field");
        f.end();
        assert_eq!(f.pos(), 5);
        f.move_left();
        f.move_left();
        f.insert('X');
        assert_eq!(f.value(), "helXlo");
        assert!(f.backspace());
        assert_eq!(f.value(), "hello");
        assert!(f.delete());
        assert_eq!(f.value(), "helo");
        f.home();
        assert!(f.delete());
        assert_eq!(f.value(), "elo");
        check_invariant(&f);
    }

    #[test]
    fn test_invariant_holds_for_every_operation() {
        let mut f = field(4, 12);
        let script = "ab日cd本ef";
        for c in script.chars() {
            f.insert(c);
            check_invariant(&f);
        }
        for _ in 0..5 {
            f.move_left();
            check_invariant(&f);
        }
        f.delete();
        check_invariant(&f);
        f.backspace();
        check_invariant(&f);
        f.end();
        check_invariant(&f);
        f.home();
        check_invariant(&f);
        f.set_cols(2);
        check_invariant(&f);
    }

    #[test]
    fn test_secure_masking_keeps_private_value() {
        let flags = FieldFlags {
            secure: true,
            ..FieldFlags::default()
        };
        let mut f = Field::new("", 8, 16, flags, Mask::Glyph('*')).expect("field");
        for c in "s3cr3t".chars() {
            f.insert(c);
        }
        assert_eq!(f.value(), "s3cr3t");
        assert_eq!(f.public_buffer(), "******");
        assert_eq!(f.visible(), "******");
    }

    #[test]
    fn test_hidden_mask_shows_nothing() {
        let flags = FieldFlags {
            secure: true,
            ..FieldFlags::default()
        };
        let mut f = Field::new("", 8, 16, flags, Mask::Hidden).expect("field");
        for c in "secret".chars() {
            f.insert(c);
        }
        assert_eq!(f.value(), "secret");
        assert_eq!(f.visible(), "");
        assert_eq!(f.cursor_col(), 0);
    }

    #[test]
    fn test_readonly_and_single_byte() {
        let readonly = FieldFlags {
            readonly: true,
            ..FieldFlags::default()
        };
        let mut f = Field::new("fixed", 8, 8, readonly, Mask::default()).expect("field");
        assert!(!f.insert('x'));
        assert!(!f.delete());
        assert_eq!(f.value(), "fixed");

        let ascii = FieldFlags {
            single_byte: true,
            ..FieldFlags::default()
        };
        let mut f = Field::new("", 8, 8, ascii, Mask::default()).expect("field");
        assert!(!f.insert('é'));
        assert!(f.insert('e'));
    }

    #[test]
    fn test_set_cols_keeps_cursor_character() {
        let mut f = Field::new("abcdefgh", 3, 10, FieldFlags::default(), Mask::default()).expect("field");
        f.end();
        f.set_cols(20);
        assert_eq!(f.pos(), 8);
        assert_eq!(f.scroll(), 0);
        assert_eq!(f.cursor_col(), 8);
    }
}
