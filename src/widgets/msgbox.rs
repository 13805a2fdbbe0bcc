//! Prompt-only dialogs: message, yes/no question and the non-blocking info box.

use crate::dialog::{self, draw, Buttons, Content, Dialog, DialogWidget, Flow, Options, Outcome};
use crate::error::DialogError;
use crate::ui::{Session, Theme};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;

/// No body of its own; scrolls the prompt when it overflows.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageBody;

impl DialogWidget for MessageBody {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        dialog.place(opts, Content::default(), screen)
    }

    fn draw(&self, dialog: &Dialog, _opts: &Options, theme: &Theme, frame: &mut Frame) {
        let overflow = dialog.prompt_overflow();
        if overflow == 0 {
            return;
        }
        let area = dialog.area();
        let bottom_y = if dialog.has_buttons() {
            dialog.separator_y()
        } else {
            area.bottom().saturating_sub(1)
        };
        draw::scroll_arrows(
            frame.buffer_mut(),
            area.right().saturating_sub(6),
            area.y,
            bottom_y,
            dialog.prompt_top > 0,
            dialog.prompt_top < overflow,
            theme,
        );
    }

    fn handle_key(&mut self, dialog: &mut Dialog, _opts: &Options, key: KeyEvent) -> Flow {
        let overflow = dialog.prompt_overflow();
        if overflow == 0 {
            return Flow::Ignored;
        }
        let page = usize::from(dialog.text_area().height.max(1));
        let top = dialog.prompt_top;
        dialog.prompt_top = match key.code {
            KeyCode::Up => top.saturating_sub(1),
            KeyCode::Down => (top + 1).min(overflow),
            KeyCode::PageUp => top.saturating_sub(page),
            KeyCode::PageDown => (top + page).min(overflow),
            KeyCode::Home => 0,
            KeyCode::End => overflow,
            _ => return Flow::Ignored,
        };
        Flow::Continue
    }
}

fn prompt_dialog<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    buttons: Buttons,
    rows: i32,
    cols: i32,
) -> Result<Outcome<()>, DialogError> {
    let mut dialog = Dialog::new(text, opts, buttons, rows, cols);
    let finished = dialog::shell::run(session, opts, &mut dialog, &mut MessageBody)?;
    Ok(Outcome {
        result: finished.result,
        value: (),
        size: finished.size,
    })
}

/// Show `text` with a single OK button.
pub fn msgbox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
) -> Result<Outcome<()>, DialogError> {
    let single = Options {
        no_cancel: true,
        ..opts.clone()
    };
    let result = prompt_dialog(session, &single, text, Buttons::standard(&single), rows, cols);
    session.record(result)
}

/// Ask a question; Yes reports `Ok`, No reports `Cancel`.
pub fn yesno<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
) -> Result<Outcome<()>, DialogError> {
    let result = prompt_dialog(session, opts, text, Buttons::yes_no(opts), rows, cols);
    session.record(result)
}

/// Draw `text` without buttons and return at once, leaving it on screen.
pub fn infobox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
) -> Result<Outcome<()>, DialogError> {
    let mut dialog = Dialog::new(text, opts, Buttons::standard(opts), rows, cols).without_buttons();
    let result = dialog::shell::present(session, opts, &mut dialog, &mut MessageBody).map(|size| Outcome {
        result: dialog::DialogResult::Ok,
        value: (),
        size,
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

    #[test]
    fn test_long_prompt_scrolls_within_overflow() {
        let opts = Options::default();
        let text = "line\\n".repeat(20);
        let mut dialog = Dialog::new(&text, &opts, Buttons::standard(&opts), 10, 30);
        let mut body = MessageBody;
        body.layout(&mut dialog, &opts, Rect::new(0, 0, 80, 24))
            .expect("fits");
        assert_eq!(dialog.prompt_overflow(), 14);

        assert_eq!(body.handle_key(&mut dialog, &opts, key(KeyCode::Down)), Flow::Continue);
        assert_eq!(dialog.prompt_top, 1);
        body.handle_key(&mut dialog, &opts, key(KeyCode::End));
        assert_eq!(dialog.prompt_top, 14);
        body.handle_key(&mut dialog, &opts, key(KeyCode::PageDown));
        assert_eq!(dialog.prompt_top, 14);
        body.handle_key(&mut dialog, &opts, key(KeyCode::PageUp));
        assert_eq!(dialog.prompt_top, 8);
    }

    #[test]
    fn test_short_prompt_leaves_keys_to_buttons() {
        let opts = Options::default();
        let mut dialog = Dialog::new("Hello", &opts, Buttons::standard(&opts), 0, 0);
        let mut body = MessageBody;
        body.layout(&mut dialog, &opts, Rect::new(0, 0, 80, 24))
            .expect("fits");
        assert_eq!(body.handle_key(&mut dialog, &opts, key(KeyCode::Down)), Flow::Ignored);
        assert_eq!(dialog.prompt_top, 0);
    }
}
