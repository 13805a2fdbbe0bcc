//! Errors reported by widget calls.

use std::fmt;
use thiserror::Error;

/// Which side of a dialog failed a size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Rows,
    Cols,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Rows => f.write_str("rows"),
            Dimension::Cols => f.write_str("columns"),
        }
    }
}

/// Errors that end a widget call before it produces a result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// Invalid arguments, detected before anything is drawn
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The requested or computed geometry is below the widget minimum
    #[error("Not enough {dimension}: need {needed}, have {available}")]
    Sizing {
        dimension: Dimension,
        needed: u16,
        available: u16,
    },

    /// The terminal backend failed (draw, size query, event read)
    #[error("Terminal error: {0}")]
    Resource(String),
}

impl DialogError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        DialogError::Config(message.into())
    }

    pub(crate) fn resource(err: impl fmt::Display) -> Self {
        DialogError::Resource(err.to_string())
    }

    pub(crate) fn rows(needed: u16, available: u16) -> Self {
        DialogError::Sizing {
            dimension: Dimension::Rows,
            needed,
            available,
        }
    }

    pub(crate) fn cols(needed: u16, available: u16) -> Self {
        DialogError::Sizing {
            dimension: Dimension::Cols,
            needed,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_message_names_dimension() {
        let err = DialogError::rows(12, 8);
        assert_eq!(err.to_string(), "Not enough rows: need 12, have 8");

        let err = DialogError::cols(40, 30);
        assert_eq!(err.to_string(), "Not enough columns: need 40, have 30");
    }

    #[test]
    fn test_resource_wraps_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "tty gone");
        let err = DialogError::resource(io);
        assert_eq!(err.to_string(), "Terminal error: tty gone");
    }
}
