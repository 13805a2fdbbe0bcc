//! Forms: labels and edit fields placed on a grid below the prompt.
//!
//! Positions are 0-based rows/columns inside the form area. The form area
//! scrolls vertically when it has fewer rows than the furthest item.

use super::field::{Field, FieldFlags};
use super::nav::{self, Navigable};
use super::{is_plain_char, leave_buttons, to_buttons};
use crate::dialog::{self, draw, Content, Dialog, DialogWidget, Flow, Options, Outcome, SizeRequest};
use crate::error::DialogError;
use crate::text::str_width;
use crate::ui::{Session, Theme};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;

/// Columns given to an input box field before it is extended.
const INPUT_COLS: u16 = 30;

/// One label and its field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormItem {
    pub label: String,
    pub label_y: u16,
    pub label_x: u16,
    pub init: String,
    pub field_y: u16,
    pub field_x: u16,
    /// Visible field width.
    pub cols: u16,
    pub max_len: usize,
    pub flags: FieldFlags,
    pub bottom_desc: Option<String>,
}

impl FormItem {
    pub fn new(label: impl Into<String>, (label_y, label_x): (u16, u16), init: impl Into<String>, (field_y, field_x): (u16, u16), cols: u16, max_len: usize) -> Self {
        Self {
            label: label.into(),
            label_y,
            label_x,
            init: init.into(),
            field_y,
            field_x,
            cols,
            max_len,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_bottom_desc(mut self, text: impl Into<String>) -> Self {
        self.bottom_desc = Some(text.into());
        self
    }

    fn label_width(&self) -> u16 {
        u16::try_from(str_width(&self.label)).unwrap_or(u16::MAX)
    }

    /// Rows and columns this item reaches into.
    fn extent(&self) -> (u16, u16) {
        let rows = self.label_y.max(self.field_y).saturating_add(1);
        let label_end = self.label_x.saturating_add(self.label_width());
        let field_end = self.field_x.saturating_add(self.cols);
        (rows, label_end.max(field_end))
    }
}

/// Field values; present on OK, or on any exit with `report_on_any_exit`.
pub type FormOutcome = Outcome<Option<Vec<String>>>;

#[derive(Debug, Clone)]
struct Entry {
    item: FormItem,
    field: Field,
}

impl Navigable for Entry {
    fn navigable(&self) -> bool {
        !self.item.flags.readonly
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    entries: Vec<Entry>,
    focus: Option<usize>,
    on_buttons: bool,
    rows_request: SizeRequest,
    extent: (u16, u16),
    area: Rect,
    top: u16,
}

impl FormState {
    /// Validate `items` and build their fields; nothing is drawn on error.
    pub fn new(items: &[FormItem], form_rows: i32, opts: &Options) -> Result<Self, DialogError> {
        if items.is_empty() {
            return Err(DialogError::config("form needs at least one item"));
        }
        let entries = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let field = Field::new(&item.init, item.cols, item.max_len, item.flags, opts.secure_mask)
                    .map_err(|e| match e {
                        DialogError::Config(msg) => DialogError::Config(format!("item {}: {msg}", i + 1)),
                        other => other,
                    })?;
                Ok(Entry {
                    item: item.clone(),
                    field,
                })
            })
            .collect::<Result<Vec<_>, DialogError>>()?;

        let extent = items.iter().map(FormItem::extent).fold((0, 0), |acc, e| {
            (acc.0.max(e.0), acc.1.max(e.1))
        });
        let focus = nav::first(&entries);
        Ok(Self {
            entries,
            focus,
            on_buttons: focus.is_none(),
            rows_request: SizeRequest::from(form_rows),
            extent,
            area: Rect::default(),
            top: 0,
        })
    }

    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.field.value()).collect()
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.entries.get(index).map(|e| &e.field)
    }

    fn focused_field(&mut self) -> Option<&mut Field> {
        let index = self.focus?;
        Some(&mut self.entries[index].field)
    }

    fn set_focus(&mut self, index: Option<usize>) {
        if let Some(index) = index {
            self.focus = Some(index);
            self.scroll_to_focus();
        }
    }

    fn scroll_to_focus(&mut self) {
        let Some(index) = self.focus else {
            return;
        };
        let y = usize::from(self.entries[index].item.field_y);
        let rows = usize::from(self.area.height.max(1));
        let len = usize::from(self.extent.0);
        self.top = u16::try_from(nav::scroll_to(usize::from(self.top), y, rows, len)).unwrap_or(0);
    }

    /// Editing and field traversal keys.
    pub fn handle_field_key(&mut self, key: KeyEvent) -> Flow {
        let Some(focus) = self.focus else {
            return Flow::Ignored;
        };
        match key.code {
            KeyCode::Up => self.set_focus(nav::prev(&self.entries, focus)),
            KeyCode::Down => self.set_focus(nav::next(&self.entries, focus)),
            KeyCode::PageUp => self.set_focus(nav::first(&self.entries)),
            KeyCode::PageDown => self.set_focus(nav::last(&self.entries)),
            KeyCode::Enter | KeyCode::Esc | KeyCode::F(_) => return Flow::Ignored,
            code => {
                let Some(field) = self.focused_field() else {
                    return Flow::Ignored;
                };
                match code {
                    KeyCode::Left => field.move_left(),
                    KeyCode::Right => field.move_right(),
                    KeyCode::Home => field.home(),
                    KeyCode::End => field.end(),
                    KeyCode::Backspace => field.backspace(),
                    KeyCode::Delete => field.delete(),
                    KeyCode::Char(c) if is_plain_char(&key) => field.insert(c),
                    _ => return Flow::Ignored,
                };
            }
        }
        Flow::Continue
    }
}

impl DialogWidget for FormState {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        let (extent_rows, extent_cols) = self.extent;
        let wanted = match self.rows_request {
            SizeRequest::Fixed(n) => n.min(extent_rows),
            SizeRequest::Auto | SizeRequest::Full => extent_rows,
        }
        .max(1);
        dialog.place(opts, Content::growing(wanted, 1, extent_cols.saturating_add(2)), screen)?;

        let body = dialog.body();
        let rows = match self.rows_request {
            SizeRequest::Fixed(n) => n.min(body.height),
            _ => body.height.min(extent_rows),
        };
        self.area = Rect::new(body.x + 1, body.y, body.width.saturating_sub(2), rows.max(1));

        for entry in &mut self.entries {
            let flags = entry.item.flags;
            if flags.extend {
                let room = self.area.width.saturating_sub(entry.item.field_x);
                entry.field.set_cols(room.max(entry.item.cols));
            }
            if flags.cursor_end {
                entry.field.end();
            }
        }
        self.scroll_to_focus();
        Ok(())
    }

    fn draw(&self, dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        let area = self.area;
        let buf = frame.buffer_mut();
        let right = area.right();
        let visible = |y: u16| y >= self.top && y < self.top + area.height;
        let mut cursor = None;

        for (i, entry) in self.entries.iter().enumerate() {
            let item = &entry.item;
            if visible(item.label_y) && !item.label.is_empty() {
                let y = area.y + item.label_y - self.top;
                draw::put_str(buf, area.x + item.label_x, y, &item.label, right, theme.style("dialog"));
            }
            if !visible(item.field_y) {
                continue;
            }
            let focused = Some(i) == self.focus && !self.on_buttons;
            let style = if item.flags.no_color {
                theme.style("dialog")
            } else if item.flags.readonly {
                theme.style("field.readonly")
            } else if focused {
                theme.style("field.active")
            } else {
                theme.style("field")
            };
            let y = area.y + item.field_y - self.top;
            let x = area.x + item.field_x;
            let cols = u16::try_from(entry.field.cols()).unwrap_or(u16::MAX);
            let field_right = x.saturating_add(cols).min(right);
            draw::fill(buf, Rect::new(x, y, field_right.saturating_sub(x), 1), style);
            draw::put_str(buf, x, y, &entry.field.visible(), field_right, style);
            if focused {
                let col = u16::try_from(entry.field.cursor_col()).unwrap_or(0);
                cursor = Some((x + col, y));
            }
        }

        let frame_area = dialog.area();
        draw::scroll_arrows(
            buf,
            frame_area.right().saturating_sub(6),
            frame_area.y,
            dialog.separator_y(),
            self.top > 0,
            self.top + area.height < self.extent.0,
            theme,
        );

        if opts.item_help {
            let desc = self.focus.and_then(|i| self.entries[i].item.bottom_desc.as_deref());
            if let Some(text) = desc {
                draw::bottom_line(buf, text, theme);
            }
        }
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }

    fn handle_key(&mut self, dialog: &mut Dialog, _opts: &Options, key: KeyEvent) -> Flow {
        if self.on_buttons {
            if leave_buttons(dialog, &key) && self.focus.is_some() {
                self.on_buttons = false;
                return Flow::Continue;
            }
            return Flow::Ignored;
        }
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                to_buttons(dialog, key.code == KeyCode::Tab);
                self.on_buttons = true;
                Flow::Continue
            }
            _ => self.handle_field_key(key),
        }
    }

    fn buttons_focused(&self) -> bool {
        self.on_buttons
    }
}

fn run_form<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    size: (i32, i32, i32),
    items: &[FormItem],
) -> Result<FormOutcome, DialogError> {
    let (rows, cols, form_rows) = size;
    let mut state = FormState::new(items, form_rows, opts)?;
    let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols);
    let finished = dialog::shell::run(session, opts, &mut dialog, &mut state)?;
    let report = finished.result == dialog::DialogResult::Ok || opts.report_on_any_exit;
    Ok(Outcome {
        result: finished.result,
        value: report.then(|| state.values()),
        size: finished.size,
    })
}

/// Form whose items carry their own flags (secure, read-only, ...).
pub fn mixedform<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    form_rows: i32,
    items: &[FormItem],
) -> Result<FormOutcome, DialogError> {
    let result = run_form(session, opts, text, (rows, cols, form_rows), items);
    session.record(result)
}

/// Form of plain editable fields.
pub fn form<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    form_rows: i32,
    items: &[FormItem],
) -> Result<FormOutcome, DialogError> {
    let items: Vec<FormItem> = items
        .iter()
        .map(|item| FormItem {
            flags: FieldFlags {
                secure: false,
                ..item.flags
            },
            ..item.clone()
        })
        .collect();
    mixedform(session, opts, text, rows, cols, form_rows, &items)
}

/// Form where every field is masked.
pub fn passwordform<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    form_rows: i32,
    items: &[FormItem],
) -> Result<FormOutcome, DialogError> {
    let items: Vec<FormItem> = items
        .iter()
        .map(|item| FormItem {
            flags: FieldFlags {
                secure: true,
                ..item.flags
            },
            ..item.clone()
        })
        .collect();
    mixedform(session, opts, text, rows, cols, form_rows, &items)
}

fn single_field(opts: &Options, init: &str, secure: bool) -> FormItem {
    let width = u16::try_from(str_width(init)).unwrap_or(u16::MAX);
    FormItem {
        init: init.to_string(),
        cols: width.saturating_add(1).max(INPUT_COLS),
        max_len: opts.max_input.max(init.chars().count()),
        flags: FieldFlags {
            secure,
            extend: true,
            cursor_end: true,
            ..FieldFlags::default()
        },
        ..FormItem::default()
    }
}

fn run_single<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    item: FormItem,
) -> Result<Outcome<Option<String>>, DialogError> {
    let outcome = mixedform(session, opts, text, rows, cols, 1, &[item])?;
    Ok(outcome.map(|values| values.and_then(|v| v.into_iter().next())))
}

/// One-line text entry.
pub fn inputbox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    init: &str,
) -> Result<Outcome<Option<String>>, DialogError> {
    run_single(session, opts, text, rows, cols, single_field(opts, init, false))
}

/// One-line masked entry.
pub fn passwordbox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    init: &str,
) -> Result<Outcome<Option<String>>, DialogError> {
    run_single(session, opts, text, rows, cols, single_field(opts, init, true))
}
