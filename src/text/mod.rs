//! # Text Layout Engine
//!
//! Pure transforms from raw prompt text to display lines.
//!
//! ## Rules
//!
//! - literal `\n` (backslash + `n`) forces a break when escape expansion is on
//! - a real newline is a break with `cr_wrap`, otherwise a blank
//! - tabs expand to the next tab stop or collapse to one blank
//! - `\Z` + selector changes attributes and takes no columns
//! - words are never split; a word wider than the line gets its own line
//!
//! Widths are display columns (see [`width`]).

pub mod layout;
pub mod width;

pub use layout::{wrap, Marker, Span, StyledLine, TextAttrs, TextLayout, TextOptions};
pub use width::{char_width, str_width, truncate_to_width, widest_line};
