//! Terminal input sources.

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::time::Duration;

/// Trait for reading terminal events (allows dependency injection for testing)
pub trait EventReader {
    /// Wait for the next event.
    ///
    /// `None` blocks until input arrives; `Some(t)` gives up after `t` and
    /// returns `Ok(None)`.
    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
pub struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<Event>> {
        match timeout {
            None => Ok(Some(event::read().context("Failed to read terminal event")?)),
            Some(t) => {
                if event::poll(t).context("Failed to poll for events")? {
                    Ok(Some(event::read().context("Failed to read terminal event")?))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Replays a fixed sequence of events.
///
/// A `None` entry plays back as an expired timeout. Running out of events is
/// an error, so a dialog that never terminates fails instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<Option<Event>>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().map(Some).collect(),
        }
    }

    /// Append a key press.
    pub fn key(mut self, code: KeyCode) -> Self {
        self.events
            .push_back(Some(Event::Key(KeyEvent::new(code, KeyModifiers::NONE))));
        self
    }

    /// Append one key press per character.
    pub fn type_str(mut self, text: &str) -> Self {
        for c in text.chars() {
            self = self.key(KeyCode::Char(c));
        }
        self
    }

    /// Append a terminal resize.
    pub fn resize(mut self, cols: u16, rows: u16) -> Self {
        self.events.push_back(Some(Event::Resize(cols, rows)));
        self
    }

    /// Append an expired read timeout.
    pub fn idle(mut self) -> Self {
        self.events.push_back(None);
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventReader for ScriptedEvents {
    fn read_event(&mut self, _timeout: Option<Duration>) -> Result<Option<Event>> {
        match self.events.pop_front() {
            Some(event) => Ok(event),
            None => bail!("scripted events exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_events_replay_in_order() {
        let mut reader = ScriptedEvents::default()
            .key(KeyCode::Char('a'))
            .idle()
            .resize(100, 40)
            .key(KeyCode::Enter);
        assert_eq!(reader.remaining(), 4);

        assert!(matches!(
            reader.read_event(None).expect("event"),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Char('a'),
                ..
            }))
        ));
        assert!(reader
            .read_event(Some(Duration::from_millis(10)))
            .expect("timeout")
            .is_none());
        assert!(matches!(
            reader.read_event(None).expect("event"),
            Some(Event::Resize(100, 40))
        ));
        assert!(matches!(
            reader.read_event(None).expect("event"),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            }))
        ));
    }

    #[test]
    fn test_scripted_events_exhausted_is_error() {
        let mut reader = ScriptedEvents::default();
        assert!(reader.read_event(None).is_err());
    }

    #[test]
    fn test_type_str_expands_to_keys() {
        let reader = ScriptedEvents::default().type_str("héllo");
        assert_eq!(reader.remaining(), 5);
    }

    #[test]
    fn test_crossterm_event_reader_type() {
        let _reader: Box<dyn EventReader> = Box::new(CrosstermEventReader);
    }
}
