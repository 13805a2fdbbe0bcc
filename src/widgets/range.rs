//! Single-bar widgets: a value picker and a countdown.

use super::bar;
use crate::dialog::{self, draw, Content, Dialog, DialogResult, DialogWidget, Flow, Options, Outcome};
use crate::error::DialogError;
use crate::ui::{Session, Theme};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;
use std::time::Duration;

const MIN_BAR_COLS: u16 = 20;
/// Bar box plus a blank column on each side.
const BOX_COLS: u16 = 4;

fn bar_box(dialog: &Dialog) -> Rect {
    let body = dialog.body();
    Rect::new(body.x + 1, body.bottom().saturating_sub(3), body.width.saturating_sub(2), 3)
}

fn draw_boxed_bar(buf: &mut ratatui::buffer::Buffer, area: Rect, perc: i32, label: &str, opts: &Options, theme: &Theme) {
    let glyphs = draw::Glyphs::for_options(opts);
    draw::border(buf, area, opts.border, glyphs, theme);
    let inner = Rect::new(area.x + 1, area.y + 1, area.width.saturating_sub(2), 1);
    bar::draw_bar(buf, inner, perc, Some(label), theme);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeState {
    min: i32,
    max: i32,
    value: i32,
}

impl RangeState {
    pub fn new(min: i32, max: i32, value: i32) -> Result<Self, DialogError> {
        if min >= max {
            return Err(DialogError::config(format!("empty range {min}..{max}")));
        }
        if !(min..=max).contains(&value) {
            return Err(DialogError::config(format!(
                "default {value} outside {min}..{max}"
            )));
        }
        Ok(Self { min, max, value })
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Position of the value inside the range, in percent.
    pub fn perc(&self) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min);
        let offset = i64::from(self.value) - i64::from(self.min);
        i32::try_from(offset * 100 / span).unwrap_or(100)
    }

    fn step(&self) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min);
        i32::try_from(span / 10).unwrap_or(i32::MAX).max(1)
    }

    fn shift(&mut self, delta: i32) {
        self.value = self.value.saturating_add(delta).clamp(self.min, self.max);
    }
}

impl DialogWidget for RangeState {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        dialog.place(opts, Content::fixed(3, MIN_BAR_COLS + BOX_COLS), screen)
    }

    fn draw(&self, dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        let area = bar_box(dialog);
        draw_boxed_bar(frame.buffer_mut(), area, self.perc(), &self.value.to_string(), opts, theme);
        let buf = frame.buffer_mut();
        let min = self.min.to_string();
        let max = self.max.to_string();
        draw::put_str(buf, area.x + 1, area.y, &min, area.right(), theme.style("border"));
        let max_x = area.right().saturating_sub(1 + u16::try_from(max.len()).unwrap_or(0));
        draw::put_str(buf, max_x, area.y, &max, area.right(), theme.style("border"));
    }

    fn handle_key(&mut self, _dialog: &mut Dialog, _opts: &Options, key: KeyEvent) -> Flow {
        let step = self.step();
        match key.code {
            KeyCode::Up | KeyCode::Char('+') => self.shift(1),
            KeyCode::Down | KeyCode::Char('-') => self.shift(-1),
            KeyCode::PageUp => self.shift(step),
            KeyCode::PageDown => self.shift(-step),
            KeyCode::Home => self.value = self.min,
            KeyCode::End => self.value = self.max,
            _ => return Flow::Ignored,
        }
        Flow::Continue
    }
}

/// Pick a number in `min..=max`; the value is reported on every exit.
#[allow(clippy::too_many_arguments)]
pub fn rangebox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    min: i32,
    max: i32,
    value: i32,
) -> Result<Outcome<i32>, DialogError> {
    let result = RangeState::new(min, max, value).and_then(|mut state| {
        let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols);
        let finished = dialog::shell::run(session, opts, &mut dialog, &mut state)?;
        Ok(Outcome {
            result: finished.result,
            value: state.value(),
            size: finished.size,
        })
    });
    session.record(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseState {
    total: u32,
    left: u32,
}

impl PauseState {
    pub fn new(seconds: u32) -> Result<Self, DialogError> {
        if seconds == 0 {
            return Err(DialogError::config("pause needs at least one second"));
        }
        Ok(Self {
            total: seconds,
            left: seconds,
        })
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    fn perc(&self) -> i32 {
        let perc = u64::from(self.left) * 100 / u64::from(self.total);
        i32::try_from(perc).unwrap_or(100)
    }
}

impl DialogWidget for PauseState {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        dialog.place(opts, Content::fixed(3, MIN_BAR_COLS + BOX_COLS), screen)
    }

    fn draw(&self, dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        draw_boxed_bar(frame.buffer_mut(), bar_box(dialog), self.perc(), &self.left.to_string(), opts, theme);
    }

    fn handle_key(&mut self, _dialog: &mut Dialog, _opts: &Options, _key: KeyEvent) -> Flow {
        Flow::Ignored
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(Duration::from_secs(1))
    }

    fn tick(&mut self, _dialog: &mut Dialog) -> Flow {
        self.left = self.left.saturating_sub(1);
        tracing::trace!(left = self.left, "pause tick");
        if self.left == 0 {
            Flow::Exit(DialogResult::Timeout)
        } else {
            Flow::Continue
        }
    }
}

/// Count down `seconds`; ends with `Timeout` at zero unless a button is pressed.
///
/// The value is the number of seconds left.
pub fn pause<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    seconds: u32,
) -> Result<Outcome<u32>, DialogError> {
    let result = PauseState::new(seconds).and_then(|mut state| {
        let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols);
        let finished = dialog::shell::run(session, opts, &mut dialog, &mut state)?;
        Ok(Outcome {
            result: finished.result,
            value: state.left(),
            size: finished.size,
        })
    });
    session.record(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(state: &mut RangeState, code: KeyCode) {
        let opts = Options::default();
        let mut dialog = Dialog::new("", &opts, dialog::Buttons::standard(&opts), 0, 0);
        state.handle_key(&mut dialog, &opts, key(code));
    }

    #[test]
    fn test_rejects_bad_range() {
        assert!(RangeState::new(5, 5, 5).is_err());
        assert!(RangeState::new(0, 10, 11).is_err());
        assert!(PauseState::new(0).is_err());
    }

    #[test]
    fn test_keys_move_within_bounds() {
        let mut state = RangeState::new(0, 100, 50).expect("valid");
        press(&mut state, KeyCode::Up);
        assert_eq!(state.value(), 51);
        press(&mut state, KeyCode::PageDown);
        assert_eq!(state.value(), 41);
        press(&mut state, KeyCode::End);
        press(&mut state, KeyCode::Up);
        assert_eq!(state.value(), 100);
        press(&mut state, KeyCode::Home);
        press(&mut state, KeyCode::Char('-'));
        assert_eq!(state.value(), 0);
    }

    #[test]
    fn test_perc_from_position() {
        assert_eq!(RangeState::new(-10, 10, 0).expect("valid").perc(), 50);
        assert_eq!(RangeState::new(i32::MIN, i32::MAX, i32::MAX).expect("valid").perc(), 100);
    }

    #[test]
    fn test_pause_counts_down_to_timeout() {
        let opts = Options::default();
        let mut dialog = Dialog::new("", &opts, dialog::Buttons::standard(&opts), 0, 0);
        let mut state = PauseState::new(2).expect("valid");
        assert_eq!(state.perc(), 100);
        assert_eq!(state.tick(&mut dialog), Flow::Continue);
        assert_eq!(state.perc(), 50);
        assert_eq!(state.tick(&mut dialog), Flow::Exit(DialogResult::Timeout));
        assert_eq!(state.left(), 0);
    }
}
