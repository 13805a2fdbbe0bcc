//! Date and time pickers.
//!
//! Both are a row of focus squares followed by the button row. Tab walks
//! the squares and then the buttons; leaving the last button comes back to
//! the first square.

use super::{leave_buttons, to_buttons};
use crate::dialog::{self, draw, Content, Dialog, DialogWidget, Flow, Options, Outcome};
use crate::error::DialogError;
use crate::ui::{Session, Theme};
use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Timelike};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];
const WEEKDAYS: &str = "Su Mo Tu We Th Fr Sa";
/// Day grid: 7 columns of 3 cells, minus the trailing blank, plus borders.
const GRID_COLS: u16 = 22;
/// Header, six weeks and the borders.
const GRID_ROWS: u16 = 9;
const SQUARE_ROWS: u16 = 3;

/// Which square has focus, or none while the buttons do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SquareFocus {
    square: usize,
    count: usize,
    on_buttons: bool,
}

impl SquareFocus {
    fn new(count: usize) -> Self {
        Self {
            square: 0,
            count,
            on_buttons: false,
        }
    }

    /// Tab/BackTab handling shared by both pickers.
    fn handle_tab(&mut self, dialog: &mut Dialog, key: &KeyEvent) -> Option<Flow> {
        if self.on_buttons {
            if leave_buttons(dialog, key) {
                self.on_buttons = false;
                self.square = if key.code == KeyCode::Tab { 0 } else { self.count - 1 };
                return Some(Flow::Continue);
            }
            return Some(Flow::Ignored);
        }
        match key.code {
            KeyCode::Tab if self.square + 1 < self.count => self.square += 1,
            KeyCode::BackTab if self.square > 0 => self.square -= 1,
            KeyCode::Tab | KeyCode::BackTab => {
                to_buttons(dialog, key.code == KeyCode::Tab);
                self.on_buttons = true;
            }
            _ => return None,
        }
        Some(Flow::Continue)
    }

    fn is(&self, square: usize) -> bool {
        !self.on_buttons && self.square == square
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => u32::try_from(next.signed_duration_since(first).num_days()).unwrap_or(31),
        _ => 31,
    }
}

fn square_label(buf: &mut ratatui::buffer::Buffer, area: Rect, text: &str, focused: bool, opts: &Options, theme: &Theme) -> Option<(u16, u16)> {
    let glyphs = draw::Glyphs::for_options(opts);
    draw::border(buf, area, opts.border, glyphs, theme);
    let inner = Rect::new(area.x + 1, area.y + 1, area.width.saturating_sub(2), 1);
    let style = if focused { theme.style("item.selected") } else { theme.style("item") };
    draw::fill(buf, inner, theme.style("item"));
    let w = u16::try_from(crate::text::str_width(text)).unwrap_or(0).min(inner.width);
    let x = inner.x + (inner.width - w) / 2;
    draw::put_str(buf, x, inner.y, text, inner.right(), style);
    focused.then_some((x, inner.y))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    date: NaiveDate,
    focus: SquareFocus,
    area: Rect,
}

// Tab order follows the screen: month, year, then the day grid.
const MONTH: usize = 0;
const YEAR: usize = 1;
const DAY: usize = 2;

impl CalendarState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            focus: SquareFocus::new(3),
            area: Rect::default(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn add_days(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.date = date;
        }
    }

    /// Month steps clamp the day to the end of the target month.
    fn add_months(&mut self, months: i32) {
        let moved = if months >= 0 {
            self.date.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.date.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.date = date;
        }
    }

    fn first_of_month(&self) -> NaiveDate {
        self.date.with_day(1).unwrap_or(self.date)
    }

    pub fn handle_square_key(&mut self, key: &KeyEvent) -> Flow {
        match (self.focus.square, key.code) {
            (DAY, KeyCode::Left) => self.add_days(-1),
            (DAY, KeyCode::Right) => self.add_days(1),
            (DAY, KeyCode::Up) => self.add_days(-7),
            (DAY, KeyCode::Down) => self.add_days(7),
            (DAY, KeyCode::Home) => self.date = self.first_of_month(),
            (DAY, KeyCode::End) => {
                let last = days_in_month(self.date.year(), self.date.month());
                self.date = self.date.with_day(last).unwrap_or(self.date);
            }
            (_, KeyCode::PageUp) => self.add_months(-1),
            (_, KeyCode::PageDown) => self.add_months(1),
            (MONTH, KeyCode::Up) => self.add_months(-1),
            (MONTH, KeyCode::Down) => self.add_months(1),
            (YEAR, KeyCode::Up) => self.add_months(-12),
            (YEAR, KeyCode::Down) => self.add_months(12),
            (_, KeyCode::Left | KeyCode::Right) => {}
            _ => return Flow::Ignored,
        }
        Flow::Continue
    }

    fn draw_grid(&self, buf: &mut ratatui::buffer::Buffer, area: Rect, opts: &Options, theme: &Theme) -> Option<(u16, u16)> {
        let glyphs = draw::Glyphs::for_options(opts);
        draw::border(buf, area, opts.border, glyphs, theme);
        let x0 = area.x + 1;
        let right = area.right().saturating_sub(1);
        draw::fill(buf, Rect::new(x0, area.y + 1, area.width.saturating_sub(2), area.height.saturating_sub(2)), theme.style("item"));
        draw::put_str(buf, x0, area.y + 1, WEEKDAYS, right, theme.style("title"));

        let offset = self.first_of_month().weekday().num_days_from_sunday();
        let mut cursor = None;
        for day in 1..=days_in_month(self.date.year(), self.date.month()) {
            let cell = offset + day - 1;
            let col = u16::try_from(cell % 7).unwrap_or(0);
            let row = u16::try_from(cell / 7).unwrap_or(0);
            let x = x0 + col * 3;
            let y = area.y + 2 + row;
            let selected = day == self.date.day();
            let style = if selected && self.focus.is(DAY) {
                theme.style("item.selected")
            } else if selected {
                theme.style("tag.key")
            } else {
                theme.style("item")
            };
            draw::put_str(buf, x, y, &format!("{day:>2}"), right, style);
            if selected && self.focus.is(DAY) {
                cursor = Some((x + 1, y));
            }
        }
        cursor
    }
}

impl DialogWidget for CalendarState {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        dialog.place(opts, Content::fixed(SQUARE_ROWS + GRID_ROWS, GRID_COLS + 4), screen)?;
        let body = dialog.body();
        self.area = Rect::new(
            body.x + (body.width.saturating_sub(GRID_COLS)) / 2,
            body.bottom().saturating_sub(SQUARE_ROWS + GRID_ROWS),
            GRID_COLS,
            SQUARE_ROWS + GRID_ROWS,
        );
        Ok(())
    }

    fn draw(&self, _dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        let area = self.area;
        let buf = frame.buffer_mut();
        let month_w = 14;
        let month_box = Rect::new(area.x, area.y, month_w, SQUARE_ROWS);
        let year_box = Rect::new(area.x + month_w, area.y, area.width.saturating_sub(month_w), SQUARE_ROWS);
        let grid = Rect::new(area.x, area.y + SQUARE_ROWS, area.width, GRID_ROWS);

        let month = MONTH_NAMES[usize::try_from(self.date.month0()).unwrap_or(0)];
        let mut cursor = square_label(buf, month_box, month, self.focus.is(MONTH), opts, theme);
        let year = self.date.year().to_string();
        cursor = cursor.or(square_label(buf, year_box, &year, self.focus.is(YEAR), opts, theme));
        cursor = cursor.or(self.draw_grid(buf, grid, opts, theme));
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }

    fn handle_key(&mut self, dialog: &mut Dialog, _opts: &Options, key: KeyEvent) -> Flow {
        if let Some(flow) = self.focus.handle_tab(dialog, &key) {
            return flow;
        }
        self.handle_square_key(&key)
    }

    fn buttons_focused(&self) -> bool {
        self.focus.on_buttons
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeState {
    time: NaiveTime,
    focus: SquareFocus,
    area: Rect,
}

const TIME_SQUARE_COLS: u16 = 4;

impl TimeState {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time,
            focus: SquareFocus::new(3),
            area: Rect::default(),
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Step the focused part, wrapping within its own range.
    fn step(&mut self, delta: i32) {
        let mut parts = [self.time.hour(), self.time.minute(), self.time.second()];
        let modulo = [24, 60, 60][self.focus.square];
        let part = &mut parts[self.focus.square];
        *part = (i64::from(*part) + i64::from(delta)).rem_euclid(modulo) as u32;
        if let Some(time) = NaiveTime::from_hms_opt(parts[0], parts[1], parts[2]) {
            self.time = time;
        }
    }

    pub fn handle_square_key(&mut self, key: &KeyEvent) -> Flow {
        match key.code {
            KeyCode::Up | KeyCode::Char('+') => self.step(1),
            KeyCode::Down | KeyCode::Char('-') => self.step(-1),
            KeyCode::Left => self.focus.square = self.focus.square.saturating_sub(1),
            KeyCode::Right => self.focus.square = (self.focus.square + 1).min(self.focus.count - 1),
            _ => return Flow::Ignored,
        }
        Flow::Continue
    }
}

impl DialogWidget for TimeState {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        let width = TIME_SQUARE_COLS * 3 + 2;
        dialog.place(opts, Content::fixed(SQUARE_ROWS, width + 4), screen)?;
        let body = dialog.body();
        self.area = Rect::new(
            body.x + body.width.saturating_sub(width) / 2,
            body.bottom().saturating_sub(SQUARE_ROWS),
            width,
            SQUARE_ROWS,
        );
        Ok(())
    }

    fn draw(&self, _dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        let buf = frame.buffer_mut();
        let parts = [self.time.hour(), self.time.minute(), self.time.second()];
        let mut cursor = None;
        for (i, part) in parts.iter().enumerate() {
            let offset = u16::try_from(i).unwrap_or(0) * (TIME_SQUARE_COLS + 1);
            let square = Rect::new(self.area.x + offset, self.area.y, TIME_SQUARE_COLS, SQUARE_ROWS);
            let text = format!("{part:02}");
            cursor = cursor.or(square_label(buf, square, &text, self.focus.is(i), opts, theme));
            if i > 0 {
                draw::put_str(buf, square.x - 1, square.y + 1, ":", square.x, theme.style("dialog"));
            }
        }
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }

    fn handle_key(&mut self, dialog: &mut Dialog, _opts: &Options, key: KeyEvent) -> Flow {
        if let Some(flow) = self.focus.handle_tab(dialog, &key) {
            return flow;
        }
        self.handle_square_key(&key)
    }

    fn buttons_focused(&self) -> bool {
        self.focus.on_buttons
    }
}

/// Pick a date; the value is the date shown when the dialog ended.
pub fn calendar<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    date: NaiveDate,
) -> Result<Outcome<NaiveDate>, DialogError> {
    let mut state = CalendarState::new(date);
    let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols);
    let result = dialog::shell::run(session, opts, &mut dialog, &mut state).map(|finished| Outcome {
        result: finished.result,
        value: state.date(),
        size: finished.size,
    });
    session.record(result)
}

/// Pick a time of day.
pub fn timebox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    time: NaiveTime,
) -> Result<Outcome<NaiveTime>, DialogError> {
    let mut state = TimeState::new(time);
    let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols);
    let result = dialog::shell::run(session, opts, &mut dialog, &mut state).map(|finished| Outcome {
        result: finished.result,
        value: state.time(),
        size: finished.size,
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 4), 30);
    }

    #[test]
    fn test_day_square_moves() {
        let mut state = CalendarState::new(date(2026, 10, 31));
        state.focus.square = DAY;
        state.handle_square_key(&key(KeyCode::Right));
        assert_eq!(state.date(), date(2026, 11, 1));
        state.handle_square_key(&key(KeyCode::Up));
        assert_eq!(state.date(), date(2026, 10, 25));
        state.handle_square_key(&key(KeyCode::End));
        assert_eq!(state.date(), date(2026, 10, 31));
        state.handle_square_key(&key(KeyCode::Home));
        assert_eq!(state.date(), date(2026, 10, 1));
    }

    #[test]
    fn test_month_step_clamps_day() {
        let mut state = CalendarState::new(date(2024, 1, 31));
        state.focus.square = MONTH;
        state.handle_square_key(&key(KeyCode::Down));
        assert_eq!(state.date(), date(2024, 2, 29));
        state.focus.square = YEAR;
        state.handle_square_key(&key(KeyCode::Down));
        assert_eq!(state.date(), date(2025, 2, 28));
    }

    #[test]
    fn test_tab_walks_squares_then_buttons() {
        let opts = Options::default();
        let mut dialog = Dialog::new("", &opts, dialog::Buttons::standard(&opts), 0, 0);
        let mut state = CalendarState::new(date(2026, 1, 1));
        assert!(state.focus.is(MONTH));
        let tab = key(KeyCode::Tab);
        state.handle_key(&mut dialog, &opts, tab);
        assert!(state.focus.is(YEAR));
        state.handle_key(&mut dialog, &opts, tab);
        assert!(state.focus.is(DAY));
        state.handle_key(&mut dialog, &opts, tab);
        assert!(state.buttons_focused());
        assert_eq!(dialog.buttons.current_index(), 0);
        // OK -> Cancel is the button row's move
        assert_eq!(state.handle_key(&mut dialog, &opts, tab), Flow::Ignored);
        dialog.buttons.next();
        state.handle_key(&mut dialog, &opts, tab);
        assert!(state.focus.is(MONTH));
    }

    #[test]
    fn test_time_parts_wrap() {
        let start = NaiveTime::from_hms_opt(23, 59, 0).expect("valid time");
        let mut state = TimeState::new(start);
        state.handle_square_key(&key(KeyCode::Up));
        assert_eq!(state.time().hour(), 0);
        assert_eq!(state.time().minute(), 59);
        state.handle_square_key(&key(KeyCode::Right));
        state.handle_square_key(&key(KeyCode::Up));
        assert_eq!(state.time().minute(), 0);
        assert_eq!(state.time().hour(), 0);
        state.handle_square_key(&key(KeyCode::Right));
        state.handle_square_key(&key(KeyCode::Down));
        assert_eq!(state.time().second(), 59);
    }
}
