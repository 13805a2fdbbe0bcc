//! # UI Module
//!
//! Terminal plumbing shared by every widget call.
//!
//! ## Components
//!
//! - [`Session`] - terminal, input source, theme and last error
//! - [`EventReader`] - blocking or timed input ([`CrosstermEventReader`],
//!   [`ScriptedEvents`] for tests and playback)
//! - [`Theme`] - built-in color themes with a dotted property view
//! - [`Config`] - persisted user defaults
//!
//! ## Screen
//!
//! ```text
//! Backtitle
//! ──────────────────────────────────────────────
//!
//!          ┌────────── Title ──────────┐
//!          │ prompt text               │
//!          │  widget body              │
//!          ├───────────────────────────┤
//!          │   <  OK  >  <Cancel>      │
//!          └───────────────────────────┘▒▒
//!            ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒
//! item help line
//! ```

pub mod config;
pub mod events;
pub mod session;
pub mod theme;

pub use config::Config;
pub use events::{CrosstermEventReader, EventReader, ScriptedEvents};
pub use session::Session;
pub use theme::{Theme, ThemeValue};
