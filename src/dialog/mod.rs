//! # Dialog Shell
//!
//! The frame every widget is drawn in and the loop every widget runs in.
//!
//! ## Pieces
//!
//! - [`Options`] - per-call configuration, read-only during the call
//! - [`geometry`] - autosizing, placement and minimum checks
//! - [`Dialog`] - computed geometry, prompt, buttons and owned surfaces
//! - [`Buttons`] - the button row and its focus
//! - [`shell`] - event loop, redraw protocol and teardown
//! - [`mod@draw`] - cell-level drawing of shadow, border, titles and buttons

pub mod buttons;
pub mod draw;
pub mod frame;
pub mod geometry;
pub mod options;
pub mod result;
pub mod shell;

pub use buttons::{Button, ButtonCode, Buttons};
pub use frame::{Dialog, Surface, SurfaceKind};
pub use geometry::Content;
pub use options::{BorderStyle, EscapeMode, Mask, Options, Position, SizeRequest};
pub use result::{DialogResult, DialogSize, Outcome};
pub use shell::{DialogWidget, Finished, Flow};
