//! Per-call dialog configuration.

use super::buttons::ButtonCode;
use crate::text::TextOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Requested height or width.
///
/// Integer convention shared with the command line: negative fills the
/// screen, zero autosizes, positive is a literal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeRequest {
    Full,
    #[default]
    Auto,
    Fixed(u16),
}

impl From<i32> for SizeRequest {
    fn from(value: i32) -> Self {
        match value {
            v if v < 0 => SizeRequest::Full,
            0 => SizeRequest::Auto,
            v => SizeRequest::Fixed(u16::try_from(v).unwrap_or(u16::MAX)),
        }
    }
}

/// Where the dialog is placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Centered,
    At {
        y: u16,
        x: u16,
    },
}

/// How the frame edges are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// Light top/left edges, dark bottom/right edges.
    #[default]
    Raised,
    /// Dark top/left edges, light bottom/right edges.
    Lowered,
    /// No border lines; the frame area is left blank.
    None,
}

/// What the Escape key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Escape ends the dialog with [`DialogResult::Escape`](super::DialogResult::Escape).
    #[default]
    Distinct,
    /// Escape ends the dialog as if Cancel had been pressed.
    Cancel,
    /// Escape is ignored.
    Disabled,
}

/// How secure form fields are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    /// Every typed character is shown as this glyph.
    Glyph(char),
    /// Nothing is drawn and the cursor stays hidden.
    Hidden,
}

impl Default for Mask {
    fn default() -> Self {
        Mask::Glyph('*')
    }
}

/// Options recognized by every widget.
///
/// One value is read for the whole duration of a widget call; nothing in the
/// crate mutates it.
#[derive(Debug, Clone)]
pub struct Options {
    // -- frame --
    pub position: Position,
    pub backtitle: Option<String>,
    pub title: Option<String>,
    pub bottom_title: Option<String>,
    /// Delimit the title with tee glyphs joined to the border.
    pub title_ties: bool,
    pub shadow: bool,
    pub border: BorderStyle,
    pub ascii_lines: bool,

    // -- buttons --
    pub ok_label: Option<String>,
    pub cancel_label: Option<String>,
    pub extra_label: Option<String>,
    pub help_label: Option<String>,
    pub yes_label: Option<String>,
    pub no_label: Option<String>,
    pub exit_label: Option<String>,
    pub no_ok: bool,
    pub no_cancel: bool,
    pub extra_button: bool,
    pub help_button: bool,
    /// Additional buttons after the standard ones.
    pub generic_buttons: Vec<String>,
    pub default_button: Option<ButtonCode>,
    pub default_no: bool,
    /// A label's hotkey also presses the button.
    pub button_shortcuts: bool,

    // -- keys --
    pub escape: EscapeMode,
    pub help_file: Option<PathBuf>,
    pub help_message: Option<String>,
    /// End with `Timeout` after this long without input.
    pub timeout: Option<Duration>,
    /// Tab moves focus between the list/fields and the buttons.
    pub visit_items: bool,

    // -- text --
    pub text: TextOptions,

    // -- lists and forms --
    pub no_tags: bool,
    pub no_items: bool,
    pub item_help: bool,
    pub default_item: Option<String>,
    /// Write list state / form values back on every exit, not only on OK.
    pub report_on_any_exit: bool,
    pub secure_mask: Mask,
    pub max_input: usize,

    // -- teardown --
    /// Settle delay before the dialog is torn down.
    pub sleep: Duration,
    pub clear_after: bool,
    pub report_size: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            position: Position::Centered,
            backtitle: None,
            title: None,
            bottom_title: None,
            title_ties: false,
            shadow: true,
            border: BorderStyle::Raised,
            ascii_lines: false,
            ok_label: None,
            cancel_label: None,
            extra_label: None,
            help_label: None,
            yes_label: None,
            no_label: None,
            exit_label: None,
            no_ok: false,
            no_cancel: false,
            extra_button: false,
            help_button: false,
            generic_buttons: Vec::new(),
            default_button: None,
            default_no: false,
            button_shortcuts: true,
            escape: EscapeMode::Distinct,
            help_file: None,
            help_message: None,
            timeout: None,
            visit_items: false,
            text: TextOptions::default(),
            no_tags: false,
            no_items: false,
            item_help: false,
            default_item: None,
            report_on_any_exit: false,
            secure_mask: Mask::default(),
            max_input: 2048,
            sleep: Duration::ZERO,
            clear_after: false,
            report_size: false,
        }
    }
}

impl Options {
    /// True when F1 has something to show.
    pub fn has_help(&self) -> bool {
        self.help_file.is_some() || self.help_message.is_some()
    }

    /// Options for the nested help viewer: same look, no help, no teardown extras.
    pub fn for_help(&self) -> Options {
        Options {
            title: Some("Help".to_string()),
            text: TextOptions {
                cr_wrap: true,
                ..self.text.clone()
            },
            shadow: self.shadow,
            border: self.border,
            ascii_lines: self.ascii_lines,
            escape: EscapeMode::Distinct,
            ..Options::default()
        }
    }
}
