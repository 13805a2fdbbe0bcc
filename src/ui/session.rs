//! The terminal, input source, theme and last error shared by widget calls.

use super::events::EventReader;
use super::theme::Theme;
use crate::error::DialogError;
use crossterm::event::Event;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::time::Duration;

/// Everything a widget call needs besides its own arguments.
///
/// One session is created per program run and handed to every widget in
/// turn; only one widget uses it at a time.
pub struct Session<B: Backend> {
    pub(crate) terminal: Terminal<B>,
    pub(crate) events: Box<dyn EventReader>,
    pub(crate) theme: Theme,
    last_error: Option<String>,
}

impl<B: Backend> Session<B> {
    pub fn new(terminal: Terminal<B>, events: Box<dyn EventReader>, theme: Theme) -> Self {
        Self {
            terminal,
            events,
            theme,
            last_error: None,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    /// Replace the input source, e.g. between scripted test runs.
    pub fn set_events(&mut self, events: Box<dyn EventReader>) {
        self.events = events;
    }

    /// Message of the most recent failed widget call.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Remember the error of a finished call, if any, and pass the result on.
    pub(crate) fn record<T>(&mut self, result: Result<T, DialogError>) -> Result<T, DialogError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "dialog failed");
            self.last_error = Some(e.to_string());
        }
        result
    }

    /// Whole screen as a rectangle.
    pub(crate) fn screen_area(&self) -> Result<Rect, DialogError> {
        let size = self.terminal.size().map_err(DialogError::resource)?;
        Ok(Rect::new(0, 0, size.width, size.height))
    }

    pub(crate) fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<Event>, DialogError> {
        self.events
            .read_event(timeout)
            .map_err(|e| DialogError::Resource(format!("{e:#}")))
    }
}
