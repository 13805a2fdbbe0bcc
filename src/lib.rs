//! tdialog - character-cell dialog widgets for shell scripts and Rust programs
//!
//! This library provides message boxes, menus, checklists, forms, gauges,
//! calendars and text viewers, all drawn inside a common dialog frame and
//! driven by one event loop.
//!
//! ```no_run
//! use tdialog::dialog::Options;
//! use tdialog::ui::{CrosstermEventReader, Session, Theme};
//! use tdialog::widgets::msgbox;
//! # fn main() -> anyhow::Result<()> {
//! let terminal = ratatui::init();
//! let mut session = Session::new(
//!     terminal,
//!     Box::new(CrosstermEventReader),
//!     Theme::default_theme().clone(),
//! );
//! let outcome = msgbox::msgbox(&mut session, &Options::default(), "Hello", 0, 0);
//! ratatui::restore();
//! println!("{:?}", outcome?.result);
//! # Ok(())
//! # }
//! ```

pub mod dialog;
pub mod error;
pub mod text;
pub mod ui;
pub mod widgets;

pub use dialog::{DialogResult, Options, Outcome};
pub use error::DialogError;
