//! The event loop every interactive widget runs in.
//!
//! A widget only lays itself out, draws its body and reacts to the keys it
//! cares about. The shell owns everything else: the frame, the button row,
//! Escape, F1 help, resize, timeouts and teardown.

use super::draw;
use super::frame::Dialog;
use super::options::{EscapeMode, Options};
use super::result::{DialogResult, DialogSize};
use crate::error::DialogError;
use crate::ui::{Session, Theme};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;
use std::time::Duration;

/// What a widget did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Handled; keep going.
    Continue,
    /// Handled; the dialog is over.
    Exit(DialogResult),
    /// Not for the widget; the shell applies button handling.
    Ignored,
}

/// The widget-specific half of a dialog.
pub trait DialogWidget {
    /// Place `dialog` on `screen` and size the body.
    ///
    /// Runs before the first draw and again after every resize or help view.
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError>;

    /// Draw the body; the frame, prompt and buttons are already drawn.
    fn draw(&self, dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame);

    fn handle_key(&mut self, dialog: &mut Dialog, opts: &Options, key: KeyEvent) -> Flow;

    /// Whether the button row currently has keyboard focus.
    fn buttons_focused(&self) -> bool {
        true
    }

    /// Wake-up period for [`DialogWidget::tick`] when no key arrives.
    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    fn tick(&mut self, _dialog: &mut Dialog) -> Flow {
        Flow::Ignored
    }
}

/// How a dialog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    pub result: DialogResult,
    pub size: Option<DialogSize>,
}

/// Show `widget` in `dialog` until a terminating input, then tear down.
///
/// Teardown runs on every path, including errors.
pub fn run<B: Backend, W: DialogWidget>(
    session: &mut Session<B>,
    opts: &Options,
    dialog: &mut Dialog,
    widget: &mut W,
) -> Result<Finished, DialogError> {
    let result = event_loop(session, opts, dialog, widget);
    let size = teardown(session, opts, dialog);
    let result = result?;
    tracing::debug!(?result, "dialog finished");
    Ok(Finished {
        result,
        size: size?,
    })
}

/// Draw once and tear down, for dialogs that do not wait for input.
pub fn present<B: Backend, W: DialogWidget>(
    session: &mut Session<B>,
    opts: &Options,
    dialog: &mut Dialog,
    widget: &mut W,
) -> Result<Option<DialogSize>, DialogError> {
    let drawn = redraw(session, opts, dialog, widget, true);
    let size = teardown(session, opts, dialog);
    drawn?;
    size
}

fn event_loop<B: Backend, W: DialogWidget>(
    session: &mut Session<B>,
    opts: &Options,
    dialog: &mut Dialog,
    widget: &mut W,
) -> Result<DialogResult, DialogError> {
    redraw(session, opts, dialog, widget, true)?;

    let mut idle = Duration::ZERO;
    loop {
        let wait = match (widget.tick_interval(), opts.timeout) {
            (Some(tick), Some(limit)) => Some(tick.min(limit.saturating_sub(idle))),
            (Some(tick), None) => Some(tick),
            (None, Some(limit)) => Some(limit.saturating_sub(idle)),
            (None, None) => None,
        };

        let Some(event) = session.read_event(wait)? else {
            idle += wait.unwrap_or_default();
            if opts.timeout.is_some_and(|limit| idle >= limit) {
                return Ok(DialogResult::Timeout);
            }
            if widget.tick_interval().is_some() {
                if let Flow::Exit(result) = widget.tick(dialog) {
                    return Ok(result);
                }
                redraw(session, opts, dialog, widget, false)?;
            }
            continue;
        };

        match event {
            Event::Resize(cols, rows) => {
                tracing::debug!(cols, rows, "terminal resized");
                redraw(session, opts, dialog, widget, true)?;
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                idle = Duration::ZERO;
                if let Some(result) = dispatch(session, opts, dialog, widget, key)? {
                    return Ok(result);
                }
            }
            _ => {}
        }
    }
}

fn dispatch<B: Backend, W: DialogWidget>(
    session: &mut Session<B>,
    opts: &Options,
    dialog: &mut Dialog,
    widget: &mut W,
    key: KeyEvent,
) -> Result<Option<DialogResult>, DialogError> {
    tracing::trace!(code = ?key.code, modifiers = ?key.modifiers, "key");

    if key.code == KeyCode::F(1) && opts.has_help() {
        crate::widgets::textbox::show_help(session, opts)?;
        redraw(session, opts, dialog, widget, true)?;
        return Ok(None);
    }

    let result = match widget.handle_key(dialog, opts, key) {
        Flow::Exit(result) => Some(result),
        Flow::Continue => None,
        Flow::Ignored => button_key(dialog, opts, key),
    };
    if result.is_none() {
        redraw(session, opts, dialog, widget, false)?;
    }
    Ok(result)
}

/// Uniform button-row handling for keys the widget left alone.
pub fn button_key(dialog: &mut Dialog, opts: &Options, key: KeyEvent) -> Option<DialogResult> {
    let buttons = &mut dialog.buttons;
    match key.code {
        KeyCode::Enter => Some(buttons.current().code.into()),
        KeyCode::Esc => match opts.escape {
            EscapeMode::Distinct => Some(DialogResult::Escape),
            EscapeMode::Cancel => Some(DialogResult::Cancel),
            EscapeMode::Disabled => None,
        },
        KeyCode::Tab | KeyCode::Right => {
            buttons.next();
            None
        }
        KeyCode::BackTab | KeyCode::Left => {
            buttons.prev();
            None
        }
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            let index = buttons.find_shortcut(c)?;
            buttons.focus(index);
            buttons
                .shortcuts_enabled()
                .then(|| buttons.current().code.into())
        }
        _ => None,
    }
}

/// Draw the whole screen; with `relayout` (or a changed screen size) the
/// widget is laid out again and the terminal fully repainted first.
pub fn redraw<B: Backend, W: DialogWidget>(
    session: &mut Session<B>,
    opts: &Options,
    dialog: &mut Dialog,
    widget: &mut W,
    relayout: bool,
) -> Result<(), DialogError> {
    let screen = session.screen_area()?;
    if relayout || !dialog.is_built() || screen != dialog.screen() {
        widget.layout(dialog, opts, screen)?;
        if dialog.is_built() {
            session.terminal.clear().map_err(DialogError::resource)?;
        }
        dialog.mark_built();
    }

    let theme = &session.theme;
    let dialog: &Dialog = dialog;
    let widget: &W = widget;
    session
        .terminal
        .draw(|frame| {
            draw::screen(frame.buffer_mut(), opts, theme);
            let cursor = draw::frame(
                frame.buffer_mut(),
                dialog,
                opts,
                theme,
                widget.buttons_focused(),
            );
            if let Some((x, y)) = cursor {
                frame.set_cursor_position((x, y));
            }
            widget.draw(dialog, opts, theme, frame);
        })
        .map_err(DialogError::resource)?;
    Ok(())
}

/// Release surfaces (last first), honoring settle delay, clear and size report.
pub fn teardown<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    dialog: &mut Dialog,
) -> Result<Option<DialogSize>, DialogError> {
    if !opts.sleep.is_zero() {
        std::thread::sleep(opts.sleep);
    }
    let size = opts.report_size.then(|| dialog.size());
    let released = dialog.release_surfaces();
    tracing::debug!(surfaces = released.len(), "dialog torn down");

    if opts.clear_after && !released.is_empty() {
        let theme = &session.theme;
        session
            .terminal
            .draw(|frame| draw::screen(frame.buffer_mut(), opts, theme))
            .map_err(DialogError::resource)?;
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{Buttons, ButtonCode};

    fn dialog(opts: &Options) -> Dialog {
        Dialog::new("text", opts, Buttons::standard(opts), 0, 0)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_reports_focused_button() {
        let opts = Options::default();
        let mut d = dialog(&opts);
        assert_eq!(button_key(&mut d, &opts, key(KeyCode::Enter)), Some(DialogResult::Ok));
        assert_eq!(button_key(&mut d, &opts, key(KeyCode::Tab)), None);
        assert_eq!(
            button_key(&mut d, &opts, key(KeyCode::Enter)),
            Some(DialogResult::Cancel)
        );
    }

    #[test]
    fn test_left_right_wrap() {
        let opts = Options::default();
        let mut d = dialog(&opts);
        button_key(&mut d, &opts, key(KeyCode::Left));
        assert_eq!(d.buttons.current().code, ButtonCode::Cancel);
        button_key(&mut d, &opts, key(KeyCode::Right));
        assert_eq!(d.buttons.current().code, ButtonCode::Ok);
    }

    #[test]
    fn test_escape_policy() {
        let mut opts = Options::default();
        let mut d = dialog(&opts);
        assert_eq!(button_key(&mut d, &opts, key(KeyCode::Esc)), Some(DialogResult::Escape));
        opts.escape = EscapeMode::Cancel;
        assert_eq!(button_key(&mut d, &opts, key(KeyCode::Esc)), Some(DialogResult::Cancel));
        opts.escape = EscapeMode::Disabled;
        assert_eq!(button_key(&mut d, &opts, key(KeyCode::Esc)), None);
    }

    #[test]
    fn test_shortcut_presses_or_only_focuses() {
        let mut opts = Options::default();
        let mut d = dialog(&opts);
        assert_eq!(
            button_key(&mut d, &opts, key(KeyCode::Char('C'))),
            Some(DialogResult::Cancel)
        );

        opts.button_shortcuts = false;
        let mut d = dialog(&opts);
        assert_eq!(button_key(&mut d, &opts, key(KeyCode::Char('c'))), None);
        assert_eq!(d.buttons.current().code, ButtonCode::Cancel);
    }

    #[test]
    fn test_ctrl_chars_are_not_shortcuts() {
        let opts = Options::default();
        let mut d = dialog(&opts);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(button_key(&mut d, &opts, ctrl_c), None);
    }
}
