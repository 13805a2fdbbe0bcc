//! Progress gauges.
//!
//! `gauge` follows an update stream:
//!
//! ```text
//! 50          percentage
//! XXX         separator
//! loading     replacement prompt, any number of lines
//! XXX         separator, end marker or end of input
//! ```
//!
//! A percentage line not followed by a separator is an update on its own.
//! A record whose text is empty keeps the previous prompt.

use super::bar;
use crate::dialog::{self, draw, Content, Dialog, DialogResult, DialogWidget, Flow, Options, Outcome};
use crate::error::DialogError;
use crate::text::str_width;
use crate::ui::{Session, Theme};
use crossterm::event::KeyEvent;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use serde::Serialize;
use std::io::BufRead;

pub const DEFAULT_SEPARATOR: &str = "XXX";
pub const DEFAULT_END: &str = "EOF";

const MIN_BAR_COLS: u16 = 20;
/// Width of the status column in a mixed gauge, brackets included.
const STATUS_COLS: u16 = 17;

/// One record read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeUpdate {
    pub perc: i32,
    /// New prompt; `None` keeps the current one.
    pub text: Option<String>,
}

/// Parser over a line-oriented update source.
pub struct GaugeStream<R> {
    reader: R,
    separator: String,
    end: String,
    peeked: Option<String>,
    finished: bool,
}

impl<R: BufRead> GaugeStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            separator: DEFAULT_SEPARATOR.to_string(),
            end: DEFAULT_END.to_string(),
            peeked: None,
            finished: false,
        }
    }

    pub fn with_markers(mut self, separator: impl Into<String>, end: impl Into<String>) -> Self {
        self.separator = separator.into();
        self.end = end.into();
        self
    }

    fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.peeked.take() {
            return Some(line);
        }
        if self.finished {
            return None;
        }
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "gauge input failed; treating as end of stream");
                self.finished = true;
                None
            }
        }
    }

    /// Text lines up to the next separator, end marker or end of input.
    fn read_text(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line() {
            if line.trim() == self.separator {
                break;
            }
            if line.trim() == self.end {
                self.finished = true;
                break;
            }
            lines.push(line);
        }
        let text = lines.join("\n");
        (!text.trim().is_empty()).then_some(text)
    }

    /// Next complete record, or `None` once the stream is over.
    pub fn next_update(&mut self) -> Option<GaugeUpdate> {
        loop {
            let line = self.next_line()?;
            let token = line.trim();
            if token == self.end {
                self.finished = true;
                self.peeked = None;
                return None;
            }
            if token == self.separator {
                // separator-first record: percentage, text, separator
                let perc_line = self.next_line()?;
                let Ok(perc) = perc_line.trim().parse::<i32>() else {
                    self.peeked = Some(perc_line);
                    continue;
                };
                let text = self.read_text();
                return Some(GaugeUpdate { perc, text });
            }
            let Ok(perc) = token.parse::<i32>() else {
                tracing::debug!(line = token, "skipping gauge line");
                continue;
            };
            let text = match self.next_line() {
                Some(next) if next.trim() == self.separator => self.read_text(),
                Some(next) => {
                    self.peeked = Some(next);
                    None
                }
                None => None,
            };
            return Some(GaugeUpdate { perc, text });
        }
    }
}

impl<R: BufRead> Iterator for GaugeStream<R> {
    type Item = GaugeUpdate;

    fn next(&mut self) -> Option<GaugeUpdate> {
        self.next_update()
    }
}

/// Mixed gauge status codes, `-1` to `-11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Succeeded,
    Failed,
    Passed,
    Completed,
    Checked,
    Done,
    Skipped,
    InProgress,
    Blank,
    NotApplicable,
    Pending,
    Unknown,
}

impl Status {
    /// Status for a negative code; `None` for percentages.
    pub fn from_code(code: i32) -> Option<Status> {
        let status = match code {
            0.. => return None,
            -1 => Status::Succeeded,
            -2 => Status::Failed,
            -3 => Status::Passed,
            -4 => Status::Completed,
            -5 => Status::Checked,
            -6 => Status::Done,
            -7 => Status::Skipped,
            -8 => Status::InProgress,
            -9 => Status::Blank,
            -10 => Status::NotApplicable,
            -11 => Status::Pending,
            _ => Status::Unknown,
        };
        Some(status)
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Succeeded => "Succeeded",
            Status::Failed => "Failed",
            Status::Passed => "Passed",
            Status::Completed => "Completed",
            Status::Checked => "Checked",
            Status::Done => "Done",
            Status::Skipped => "Skipped",
            Status::InProgress => "In Progress",
            Status::Blank => "",
            Status::NotApplicable => "N/A",
            Status::Pending => "Pending",
            Status::Unknown => "UNKNOWN",
        }
    }
}

/// One row of a mixed gauge: a percentage or a negative status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedGaugeItem {
    pub label: String,
    pub value: i32,
}

impl MixedGaugeItem {
    pub fn new(label: impl Into<String>, value: i32) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Bar in a box below the prompt, plus optional item rows above it.
struct GaugeState<'a> {
    perc: i32,
    items: &'a [MixedGaugeItem],
    label_cols: u16,
    rows_area: Rect,
    bar_box: Rect,
}

impl<'a> GaugeState<'a> {
    fn new(perc: i32, items: &'a [MixedGaugeItem]) -> Self {
        let label_cols = items
            .iter()
            .map(|i| u16::try_from(str_width(&i.label)).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0);
        Self {
            perc,
            items,
            label_cols,
            rows_area: Rect::default(),
            bar_box: Rect::default(),
        }
    }

    fn item_rows(&self) -> u16 {
        u16::try_from(self.items.len()).unwrap_or(u16::MAX)
    }

    fn draw_item(&self, frame: &mut Frame, item: &MixedGaugeItem, y: u16, opts: &Options, theme: &Theme) {
        let buf = frame.buffer_mut();
        let area = self.rows_area;
        let status_x = area.right().saturating_sub(STATUS_COLS);
        draw::put_str(buf, area.x, y, &item.label, status_x.saturating_sub(1), theme.style("dialog"));
        draw::put_str(buf, status_x, y, "[", area.right(), theme.style("dialog"));
        draw::put_str(buf, status_x + STATUS_COLS - 1, y, "]", area.right(), theme.style("dialog"));
        let inner = Rect::new(status_x + 1, y, STATUS_COLS - 2, 1);

        match Status::from_code(item.value) {
            None => bar::draw_bar(buf, inner, item.value, None, theme),
            Some(status) => {
                let style = status_style(status, opts.text.colors, theme);
                let label = status.label();
                let w = u16::try_from(str_width(label)).unwrap_or(0).min(inner.width);
                let x = inner.x + (inner.width - w) / 2;
                draw::put_str(buf, x, y, label, inner.right(), style);
            }
        }
    }
}

/// Only done and failed rows stand out, and only with colors enabled.
fn status_style(status: Status, colors: bool, theme: &Theme) -> Style {
    match status {
        Status::Done if colors => theme.style("status.done"),
        Status::Failed if colors => theme.style("status.failed"),
        _ => theme.style("dialog"),
    }
}

impl DialogWidget for GaugeState<'_> {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        let item_rows = self.item_rows();
        let cols = if self.items.is_empty() {
            MIN_BAR_COLS + 4
        } else {
            (self.label_cols + 1 + STATUS_COLS).max(MIN_BAR_COLS) + 4
        };
        let rows = item_rows + if item_rows > 0 { 1 } else { 0 } + 3;
        dialog.place(opts, Content::fixed(rows, cols), screen)?;

        let body = dialog.body();
        let bottom = body.bottom();
        self.bar_box = Rect::new(body.x + 1, bottom.saturating_sub(3), body.width.saturating_sub(2), 3);
        self.rows_area = Rect::new(body.x + 1, body.y, body.width.saturating_sub(2), item_rows);
        Ok(())
    }

    fn draw(&self, _dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        for (row, item) in self.items.iter().enumerate() {
            let y = self.rows_area.y + u16::try_from(row).unwrap_or(0);
            if y >= self.rows_area.bottom() {
                break;
            }
            self.draw_item(frame, item, y, opts, theme);
        }

        let buf = frame.buffer_mut();
        let glyphs = draw::Glyphs::for_options(opts);
        draw::border(buf, self.bar_box, opts.border, glyphs, theme);
        let inner = Rect::new(
            self.bar_box.x + 1,
            self.bar_box.y + 1,
            self.bar_box.width.saturating_sub(2),
            1,
        );
        bar::draw_bar(buf, inner, self.perc, None, theme);
        if !self.items.is_empty() {
            let title = theme.style("title").add_modifier(Modifier::BOLD);
            draw::put_str(buf, self.bar_box.x + 2, self.bar_box.y, " Overall ", self.bar_box.right(), title);
        }
    }

    fn handle_key(&mut self, _dialog: &mut Dialog, _opts: &Options, _key: KeyEvent) -> Flow {
        Flow::Continue
    }
}

fn run_gauge<B: Backend, R: BufRead>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    perc: i32,
    stream: GaugeStream<R>,
) -> Result<Outcome<i32>, DialogError> {
    let mut state = GaugeState::new(perc, &[]);
    let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols).without_buttons();

    let follow = || -> Result<(), DialogError> {
        dialog::shell::redraw(session, opts, &mut dialog, &mut state, true)?;
        for update in stream {
            tracing::debug!(perc = update.perc, text = update.text.is_some(), "gauge update");
            state.perc = update.perc;
            let relayout = match update.text {
                Some(text) => {
                    dialog.prompt = crate::text::TextLayout::new(&text, &opts.text);
                    dialog.prompt_top = 0;
                    true
                }
                None => false,
            };
            dialog::shell::redraw(session, opts, &mut dialog, &mut state, relayout)?;
        }
        Ok(())
    };
    let followed = follow();
    let size = dialog::shell::teardown(session, opts, &mut dialog);
    followed?;
    Ok(Outcome {
        result: DialogResult::Ok,
        value: state.perc.clamp(0, 100),
        size: size?,
    })
}

/// Show a bar and follow `stream` until it ends; the value is the last percentage.
pub fn gauge<B: Backend, R: BufRead>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    perc: i32,
    stream: GaugeStream<R>,
) -> Result<Outcome<i32>, DialogError> {
    let result = run_gauge(session, opts, text, rows, cols, perc, stream);
    session.record(result)
}

/// One status row per item plus an overall bar; draws once and returns.
pub fn mixedgauge<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    perc: i32,
    items: &[MixedGaugeItem],
) -> Result<Outcome<()>, DialogError> {
    let mut state = GaugeState::new(perc, items);
    let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols).without_buttons();
    let result = dialog::shell::present(session, opts, &mut dialog, &mut state).map(|size| Outcome {
        result: DialogResult::Ok,
        value: (),
        size,
    });
    session.record(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(input: &str) -> GaugeStream<Cursor<Vec<u8>>> {
        GaugeStream::new(Cursor::new(input.as_bytes().to_vec()))
    }

    #[test]
    fn test_records_until_end_marker() {
        let updates: Vec<GaugeUpdate> = stream("50\nXXX\nloading\nXXX\n75\nXXX\n\nEOF\n90\n").collect();
        assert_eq!(
            updates,
            vec![
                GaugeUpdate {
                    perc: 50,
                    text: Some("loading".to_string())
                },
                GaugeUpdate { perc: 75, text: None },
            ]
        );
    }

    #[test]
    fn test_bare_numbers_are_updates() {
        let percs: Vec<i32> = stream("10\n20\n30\n").map(|u| u.perc).collect();
        assert_eq!(percs, vec![10, 20, 30]);
    }

    #[test]
    fn test_separator_first_record() {
        let updates: Vec<GaugeUpdate> = stream("XXX\n40\nline one\nline two\nXXX\n").collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].perc, 40);
        assert_eq!(updates[0].text.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_eof_without_end_marker_finishes_record() {
        let updates: Vec<GaugeUpdate> = stream("60\nXXX\nalmost").collect();
        assert_eq!(
            updates,
            vec![GaugeUpdate {
                perc: 60,
                text: Some("almost".to_string())
            }]
        );
    }

    #[test]
    fn test_custom_markers_and_junk_lines() {
        let updates: Vec<GaugeUpdate> = stream("hello\n5\n--\nx\n--\nSTOP\n")
            .with_markers("--", "STOP")
            .collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].text.as_deref(), Some("x"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::from_code(40), None);
        assert_eq!(Status::from_code(0), None);
        assert_eq!(Status::from_code(-1), Some(Status::Succeeded));
        assert_eq!(Status::from_code(-6), Some(Status::Done));
        assert_eq!(Status::from_code(-11), Some(Status::Pending));
        assert_eq!(Status::from_code(-12).map(Status::label), Some("UNKNOWN"));
    }

    #[test]
    fn test_only_done_and_failed_are_emphasized() {
        let theme = Theme::default_theme();
        assert_eq!(status_style(Status::Done, true, theme), theme.style("status.done"));
        assert_eq!(status_style(Status::Failed, true, theme), theme.style("status.failed"));
        assert_eq!(status_style(Status::Succeeded, true, theme), theme.style("dialog"));
        assert_eq!(status_style(Status::Passed, true, theme), theme.style("dialog"));
        assert_eq!(status_style(Status::Done, false, theme), theme.style("dialog"));
    }
}
