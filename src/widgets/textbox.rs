//! Read-only text viewer, used for files and for the F1 help screen.

use crate::dialog::{self, draw, Buttons, Content, Dialog, DialogWidget, Flow, Options, Outcome};
use crate::error::DialogError;
use crate::text::{self, char_width, str_width};
use crate::ui::{Session, Theme};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;
use std::path::Path;

/// Preferred width for wrapped help messages.
const MESSAGE_COLS: u16 = 60;
const MIN_COLS: u16 = 20;

#[derive(Debug, Clone)]
enum Source {
    /// Lines shown as they are, scrolled horizontally when too wide.
    Lines(Vec<String>),
    /// Text wrapped to the viewer width on every layout.
    Wrapped(String),
}

#[derive(Debug, Clone)]
pub struct TextViewer {
    source: Source,
    lines: Vec<String>,
    top: usize,
    left: usize,
    area: Rect,
}

/// Replace tabs with blanks up to the next multiple of `tab_len`.
fn expand_tabs(line: &str, tab_len: usize) -> String {
    let tab_len = tab_len.max(1);
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        if c == '\t' {
            let n = tab_len - col % tab_len;
            out.extend(std::iter::repeat(' ').take(n));
            col += n;
        } else {
            out.push(c);
            col += char_width(c);
        }
    }
    out
}

/// Suffix of `s` after its first `cols` display columns.
fn skip_cols(s: &str, cols: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        if used >= cols {
            return &s[idx..];
        }
        used += char_width(c);
    }
    ""
}

fn read_lines(path: &Path, tab_len: usize) -> Result<Vec<String>, DialogError> {
    let bytes = std::fs::read(path)
        .map_err(|e| DialogError::config(format!("cannot read {}: {e}", path.display())))?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(|line| expand_tabs(line, tab_len))
        .collect())
}

impl TextViewer {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self::with_source(Source::Lines(lines))
    }

    pub fn from_message(message: &str) -> Self {
        Self::with_source(Source::Wrapped(message.to_string()))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            lines: Vec::new(),
            top: 0,
            left: 0,
            area: Rect::default(),
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    fn rows(&self) -> usize {
        usize::from(self.area.height.max(1))
    }

    fn max_top(&self) -> usize {
        self.lines.len().saturating_sub(self.rows())
    }

    fn widest(&self) -> usize {
        self.lines.iter().map(|l| str_width(l)).max().unwrap_or(0)
    }

    pub fn handle_scroll_key(&mut self, key: &KeyEvent) -> Flow {
        let page = self.rows();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.top = self.top.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.top = (self.top + 1).min(self.max_top()),
            KeyCode::PageUp | KeyCode::Char('b') => self.top = self.top.saturating_sub(page),
            KeyCode::PageDown | KeyCode::Char(' ') => self.top = (self.top + page).min(self.max_top()),
            KeyCode::Home | KeyCode::Char('g') => self.top = 0,
            KeyCode::End | KeyCode::Char('G') => self.top = self.max_top(),
            KeyCode::Left | KeyCode::Char('h') => self.left = self.left.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => {
                let room = usize::from(self.area.width);
                self.left = (self.left + 1).min(self.widest().saturating_sub(room));
            }
            _ => return Flow::Ignored,
        }
        Flow::Continue
    }
}

impl DialogWidget for TextViewer {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        let (rows, pref_cols) = match &self.source {
            Source::Lines(lines) => {
                let widest = lines.iter().map(|l| str_width(l)).max().unwrap_or(0);
                (lines.len(), u16::try_from(widest).unwrap_or(u16::MAX))
            }
            Source::Wrapped(message) => {
                let width = usize::from(MESSAGE_COLS);
                (text::wrap(message, width, &opts.text).len(), MESSAGE_COLS)
            }
        };
        let rows = u16::try_from(rows).unwrap_or(u16::MAX).max(1);
        let content = Content::growing(rows, rows.min(3), MIN_COLS).preferring(pref_cols.saturating_add(2));
        dialog.place(opts, content, screen)?;

        let body = dialog.body();
        self.area = Rect::new(body.x + 1, body.y, body.width.saturating_sub(2), body.height);
        if let Source::Wrapped(message) = &self.source {
            self.lines = text::wrap(message, usize::from(self.area.width), &opts.text);
        } else if let Source::Lines(lines) = &self.source {
            self.lines.clone_from(lines);
        }
        self.top = self.top.min(self.max_top());
        Ok(())
    }

    fn draw(&self, dialog: &Dialog, _opts: &Options, theme: &Theme, frame: &mut Frame) {
        let buf = frame.buffer_mut();
        let area = self.area;
        for (row, line) in self.lines.iter().skip(self.top).take(self.rows()).enumerate() {
            let y = area.y + u16::try_from(row).unwrap_or(0);
            draw::put_str(buf, area.x, y, skip_cols(line, self.left), area.right(), theme.style("dialog"));
        }

        let frame_area = dialog.area();
        let below = self.top < self.max_top();
        draw::scroll_arrows(
            buf,
            frame_area.right().saturating_sub(6),
            frame_area.y,
            dialog.separator_y(),
            self.top > 0,
            below,
            theme,
        );
        if !self.lines.is_empty() {
            let shown = (self.top + self.rows()).min(self.lines.len());
            let perc = shown * 100 / self.lines.len();
            let label = format!(" {perc}% ");
            let w = u16::try_from(label.len()).unwrap_or(0);
            let x = frame_area.right().saturating_sub(w + 10);
            draw::put_str(buf, x, dialog.separator_y(), &label, frame_area.right(), theme.style("title"));
        }
    }

    fn handle_key(&mut self, _dialog: &mut Dialog, _opts: &Options, key: KeyEvent) -> Flow {
        self.handle_scroll_key(&key)
    }
}

/// Show the contents of `path` with a single EXIT button.
pub fn textbox<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    path: &Path,
    rows: i32,
    cols: i32,
) -> Result<Outcome<()>, DialogError> {
    let result = read_lines(path, opts.text.tab_len).and_then(|lines| {
        let mut viewer = TextViewer::from_lines(lines);
        let mut dialog = Dialog::new("", opts, Buttons::exit(opts), rows, cols);
        let finished = dialog::shell::run(session, opts, &mut dialog, &mut viewer)?;
        Ok(Outcome {
            result: finished.result,
            value: (),
            size: finished.size,
        })
    });
    session.record(result)
}

/// The F1 screen: help file if configured, else the inline help message.
pub fn show_help<B: Backend>(session: &mut Session<B>, opts: &Options) -> Result<(), DialogError> {
    let mut viewer = match (&opts.help_file, &opts.help_message) {
        (Some(path), _) => TextViewer::from_lines(read_lines(path, opts.text.tab_len)?),
        (None, Some(message)) => TextViewer::from_message(message),
        (None, None) => return Ok(()),
    };
    let help_opts = opts.for_help();
    let mut dialog = Dialog::new("", &help_opts, Buttons::exit(&help_opts), 0, 0);
    tracing::debug!("showing help");
    dialog::shell::run(session, &help_opts, &mut dialog, &mut viewer)?;
    Ok(())
}
