//! What a widget call ends with.

use serde::Serialize;

/// How the user left the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogResult {
    Ok,
    Cancel,
    Help,
    Extra,
    /// One of the caller-defined buttons, numbered from zero.
    Generic(u8),
    Escape,
    Timeout,
}

impl DialogResult {
    /// Process exit status used by the command line front end.
    pub fn exit_code(self) -> u8 {
        match self {
            DialogResult::Ok => 0,
            DialogResult::Cancel => 1,
            DialogResult::Help => 2,
            DialogResult::Extra => 3,
            DialogResult::Timeout => 5,
            DialogResult::Generic(n) => 6u8.saturating_add(n).min(250),
            DialogResult::Escape => 255,
        }
    }
}

/// Final dialog size, reported when [`Options::report_size`](super::Options::report_size) is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialogSize {
    pub rows: u16,
    pub cols: u16,
}

/// Result of a widget call plus whatever value the widget produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub result: DialogResult,
    pub value: T,
    pub size: Option<DialogSize>,
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            result: self.result,
            value: f(self.value),
            size: self.size,
        }
    }
}
