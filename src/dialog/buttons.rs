//! Button row state: labels, codes and the focus index.

use super::options::Options;
use super::result::DialogResult;
use crate::text::{char_width, str_width};
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

/// Gap between two buttons.
pub const BUTTON_GAP: u16 = 2;
/// Narrowest label slot, so short labels like "OK" still get a decent target.
const MIN_LABEL_COLS: u16 = 6;

/// What pressing a button reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonCode {
    Ok,
    Extra,
    Cancel,
    Help,
    Generic(u8),
}

impl From<ButtonCode> for DialogResult {
    fn from(code: ButtonCode) -> Self {
        match code {
            ButtonCode::Ok => DialogResult::Ok,
            ButtonCode::Extra => DialogResult::Extra,
            ButtonCode::Cancel => DialogResult::Cancel,
            ButtonCode::Help => DialogResult::Help,
            ButtonCode::Generic(n) => DialogResult::Generic(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub code: ButtonCode,
}

impl Button {
    pub fn new(label: impl Into<String>, code: ButtonCode) -> Self {
        Self {
            label: label.into(),
            code,
        }
    }

    /// Index (in chars) of the hotkey: the first alphanumeric character.
    pub fn hotkey_index(&self) -> Option<usize> {
        self.label.chars().position(char::is_alphanumeric)
    }

    pub fn hotkey(&self) -> Option<char> {
        self.hotkey_index()
            .and_then(|i| self.label.chars().nth(i))
            .map(|c| c.to_ascii_lowercase())
    }
}

/// Ordered, never-empty set of buttons with one focused entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buttons {
    items: Vec<Button>,
    current: usize,
    shortcuts: bool,
}

impl Buttons {
    /// Build a button row; an empty list gets a single OK button.
    pub fn new(mut items: Vec<Button>, shortcuts: bool) -> Self {
        if items.is_empty() {
            items.push(Button::new("OK", ButtonCode::Ok));
        }
        Self {
            items,
            current: 0,
            shortcuts,
        }
    }

    /// OK / Extra / Cancel / Help / generic buttons as configured.
    pub fn standard(opts: &Options) -> Self {
        Self::with_defaults(opts, "OK", "Cancel")
    }

    /// Yes / No pair for confirmation boxes.
    pub fn yes_no(opts: &Options) -> Self {
        let mut buttons = Self::from_labels(
            opts,
            opts.yes_label.as_deref().unwrap_or("Yes"),
            opts.no_label.as_deref().unwrap_or("No"),
        );
        if opts.default_no && opts.default_button.is_none() {
            buttons.select(ButtonCode::Cancel);
        }
        buttons
    }

    /// Single EXIT button for viewers.
    pub fn exit(opts: &Options) -> Self {
        let label = opts.exit_label.as_deref().unwrap_or("EXIT");
        Self::new(
            vec![Button::new(label, ButtonCode::Ok)],
            opts.button_shortcuts,
        )
    }

    fn with_defaults(opts: &Options, ok: &str, cancel: &str) -> Self {
        Self::from_labels(
            opts,
            opts.ok_label.as_deref().unwrap_or(ok),
            opts.cancel_label.as_deref().unwrap_or(cancel),
        )
    }

    fn from_labels(opts: &Options, ok: &str, cancel: &str) -> Self {
        let mut items = Vec::new();
        if !opts.no_ok {
            items.push(Button::new(ok, ButtonCode::Ok));
        }
        if opts.extra_button {
            let label = opts.extra_label.as_deref().unwrap_or("Extra");
            items.push(Button::new(label, ButtonCode::Extra));
        }
        if !opts.no_cancel {
            items.push(Button::new(cancel, ButtonCode::Cancel));
        }
        if opts.help_button {
            let label = opts.help_label.as_deref().unwrap_or("Help");
            items.push(Button::new(label, ButtonCode::Help));
        }
        for (i, label) in opts.generic_buttons.iter().enumerate() {
            let n = u8::try_from(i).unwrap_or(u8::MAX);
            items.push(Button::new(label.clone(), ButtonCode::Generic(n)));
        }

        let mut buttons = Self::new(items, opts.button_shortcuts);
        if let Some(code) = opts.default_button {
            buttons.select(code);
        }
        buttons
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Button> {
        self.items.iter()
    }

    pub fn current(&self) -> &Button {
        &self.items[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn shortcuts_enabled(&self) -> bool {
        self.shortcuts
    }

    /// Focus the button with `code`; returns false when there is none.
    pub fn select(&mut self, code: ButtonCode) -> bool {
        match self.items.iter().position(|b| b.code == code) {
            Some(i) => {
                self.current = i;
                true
            }
            None => false,
        }
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        self.current = (self.current + self.items.len() - 1) % self.items.len();
    }

    /// Button whose hotkey matches `c`, case-insensitively.
    pub fn find_shortcut(&self, c: char) -> Option<usize> {
        let c = c.to_ascii_lowercase();
        self.items.iter().position(|b| b.hotkey() == Some(c))
    }

    /// Focus a button by index, clamping to the valid range.
    pub fn focus(&mut self, index: usize) {
        self.current = index.min(self.items.len() - 1);
    }

    /// Columns taken by one button, brackets included.
    pub fn button_width(&self) -> u16 {
        let widest = self
            .items
            .iter()
            .map(|b| u16::try_from(str_width(&b.label)).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0);
        widest.max(MIN_LABEL_COLS) + 4
    }

    /// Columns taken by the whole row.
    pub fn row_width(&self) -> u16 {
        let n = u16::try_from(self.items.len()).unwrap_or(u16::MAX);
        n.saturating_mul(self.button_width())
            .saturating_add(n.saturating_sub(1).saturating_mul(BUTTON_GAP))
    }

    /// Rectangles of each button, centered in `row`.
    pub fn layout(&self, row: Rect) -> Vec<Rect> {
        let bw = self.button_width();
        let start = row.x + row.width.saturating_sub(self.row_width()) / 2;
        (0..self.items.len())
            .map(|i| {
                let i = u16::try_from(i).unwrap_or(u16::MAX);
                let x = start.saturating_add(i.saturating_mul(bw + BUTTON_GAP));
                Rect::new(x, row.y, bw, 1).intersection(row)
            })
            .collect()
    }

    /// Column offset of the label inside a button slot.
    pub fn label_offset(&self, button: &Button) -> u16 {
        let inner = self.button_width() - 2;
        let w = u16::try_from(button.label.chars().map(char_width).sum::<usize>()).unwrap_or(0);
        1 + inner.saturating_sub(w) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_synthesizes_ok() {
        let buttons = Buttons::new(Vec::new(), false);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons.current().code, ButtonCode::Ok);
    }

    #[test]
    fn test_standard_order() {
        let opts = Options {
            extra_button: true,
            help_button: true,
            ..Options::default()
        };
        let codes: Vec<ButtonCode> = Buttons::standard(&opts).iter().map(|b| b.code).collect();
        assert_eq!(
            codes,
            vec![
                ButtonCode::Ok,
                ButtonCode::Extra,
                ButtonCode::Cancel,
                ButtonCode::Help
            ]
        );
    }

    #[test]
    fn test_no_ok_no_cancel_still_has_a_button() {
        let opts = Options {
            no_ok: true,
            no_cancel: true,
            ..Options::default()
        };
        let buttons = Buttons::standard(&opts);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons.current().code, ButtonCode::Ok);
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut buttons = Buttons::standard(&Options::default());
        assert_eq!(buttons.current_index(), 0);
        buttons.next();
        assert_eq!(buttons.current_index(), 1);
        buttons.next();
        assert_eq!(buttons.current_index(), 0);
        buttons.prev();
        assert_eq!(buttons.current_index(), 1);
    }

    #[test]
    fn test_shortcut_is_case_insensitive() {
        let buttons = Buttons::standard(&Options::default());
        assert_eq!(buttons.find_shortcut('c'), Some(1));
        assert_eq!(buttons.find_shortcut('O'), Some(0));
        assert_eq!(buttons.find_shortcut('z'), None);
    }

    #[test]
    fn test_default_no_focuses_no() {
        let opts = Options {
            default_no: true,
            ..Options::default()
        };
        let buttons = Buttons::yes_no(&opts);
        assert_eq!(buttons.current().label, "No");
    }

    #[test]
    fn test_default_button() {
        let opts = Options {
            default_button: Some(ButtonCode::Cancel),
            ..Options::default()
        };
        assert_eq!(Buttons::standard(&opts).current().code, ButtonCode::Cancel);
    }

    #[test]
    fn test_layout_is_centered() {
        let buttons = Buttons::standard(&Options::default());
        // two buttons of 10 columns plus a gap of 2
        assert_eq!(buttons.row_width(), 22);
        let rects = buttons.layout(Rect::new(0, 5, 42, 1));
        assert_eq!(rects[0], Rect::new(10, 5, 10, 1));
        assert_eq!(rects[1], Rect::new(22, 5, 10, 1));
    }
}
