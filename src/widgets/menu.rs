//! # List/Menu Selection Engine
//!
//! Menus, checklists, radiolists, trees and mixed lists are one widget: a
//! sequence of groups, each with a kind, flattened into a single navigable
//! list drawn in aligned columns.
//!
//! ```text
//! prefix  selector  indent  name   description
//! *       [X]               vim    Vi IMproved
//!         [ ]               nano   Small editor
//! ──────── Network ────────
//!         (*)         ..    eth0   Wired
//! ```
//!
//! Item `on` flags are only written back to the caller's groups when the
//! dialog ends with OK, or on every exit with `report_on_any_exit`.

use super::nav::{self, Navigable};
use super::{is_plain_char, leave_buttons, to_buttons};
use crate::dialog::{
    self, draw, Content, Dialog, DialogResult, DialogWidget, Flow, Options, Outcome, SizeRequest,
};
use crate::error::DialogError;
use crate::text::{str_width, truncate_to_width};
use crate::ui::{Session, Theme};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Frame;
use serde::{Deserialize, Serialize};

const SELECTOR_COLS: u16 = 4;
const DEPTH_COLS: u16 = 2;
const NAME_GAP: u16 = 2;
/// Box border plus one blank column on each side, inside and outside the box.
const BOX_COLS: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Any number of items on.
    Checklist,
    /// At most one item on.
    Radiolist,
    /// Choosing an item ends the dialog.
    Menu,
    /// Non-selectable labels.
    Separator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItem {
    pub prefix: String,
    pub on: bool,
    pub depth: u16,
    pub name: String,
    pub desc: String,
    pub bottom_desc: Option<String>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            ..Self::default()
        }
    }

    pub fn with_on(mut self, on: bool) -> Self {
        self.on = on;
        self
    }

    pub fn with_depth(mut self, depth: u16) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_bottom_desc(mut self, text: impl Into<String>) -> Self {
        self.bottom_desc = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub kind: GroupKind,
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    pub fn new(kind: GroupKind, items: Vec<MenuItem>) -> Self {
        Self { kind, items }
    }
}

/// Where the cursor was when the dialog ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MenuFocus {
    pub group: Option<usize>,
    pub item: Option<usize>,
}

pub type MenuOutcome = Outcome<MenuFocus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    group: usize,
    item: usize,
    separator: bool,
}

impl Navigable for Entry {
    fn navigable(&self) -> bool {
        !self.separator
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Columns {
    prefix: u16,
    selector: u16,
    indent: u16,
    name: u16,
    desc: u16,
    separator: u16,
}

impl Columns {
    /// Columns up to and including the name.
    fn required(&self) -> u16 {
        self.prefix + self.selector + self.indent + self.name
    }

    fn total(&self) -> u16 {
        let gap = if self.name > 0 && self.desc > 0 { NAME_GAP } else { 0 };
        (self.required() + gap + self.desc).max(self.separator)
    }
}

fn width16(s: &str) -> u16 {
    u16::try_from(str_width(s)).unwrap_or(u16::MAX)
}

/// Selection state of a menu-like dialog.
#[derive(Debug, Clone)]
pub struct MenuState {
    groups: Vec<MenuGroup>,
    entries: Vec<Entry>,
    focus: Option<usize>,
    top: usize,
    columns: Columns,
    list_request: SizeRequest,
    list_rows: u16,
    list_box: Rect,
    visit_items: bool,
    on_buttons: bool,
}

impl MenuState {
    pub fn new(mut groups: Vec<MenuGroup>, list_rows: i32, opts: &Options) -> Self {
        for group in groups.iter_mut().filter(|g| g.kind == GroupKind::Radiolist) {
            let mut seen = false;
            for item in &mut group.items {
                if item.on && seen {
                    item.on = false;
                }
                seen |= item.on;
            }
        }

        let entries: Vec<Entry> = groups
            .iter()
            .enumerate()
            .flat_map(|(g, group)| {
                (0..group.items.len()).map(move |i| Entry {
                    group: g,
                    item: i,
                    separator: group.kind == GroupKind::Separator,
                })
            })
            .collect();

        let default = opts.default_item.as_deref().and_then(|name| {
            entries
                .iter()
                .position(|e| !e.separator && groups[e.group].items[e.item].name == name)
        });
        let focus = default.or_else(|| nav::first(&entries));

        let mut state = Self {
            groups,
            entries,
            focus,
            top: 0,
            columns: Columns::default(),
            list_request: SizeRequest::from(list_rows),
            list_rows: 0,
            list_box: Rect::default(),
            visit_items: opts.visit_items,
            on_buttons: focus.is_none(),
        };
        state.columns = state.measure(opts);
        state
    }

    fn measure(&self, opts: &Options) -> Columns {
        let mut cols = Columns::default();
        for entry in &self.entries {
            let group = &self.groups[entry.group];
            let item = &group.items[entry.item];
            if entry.separator {
                let label = width16(&item.name).max(width16(&item.desc));
                cols.separator = cols.separator.max(label + 4);
                continue;
            }
            cols.prefix = cols.prefix.max(width16(&item.prefix));
            if matches!(group.kind, GroupKind::Checklist | GroupKind::Radiolist) {
                cols.selector = SELECTOR_COLS;
            }
            cols.indent = cols.indent.max(item.depth.saturating_mul(DEPTH_COLS));
            if !opts.no_tags {
                cols.name = cols.name.max(width16(&item.name));
            }
            if !opts.no_items {
                cols.desc = cols.desc.max(width16(&item.desc));
            }
        }
        if cols.prefix > 0 {
            cols.prefix += 1;
        }
        cols
    }

    fn item(&self, entry: Entry) -> &MenuItem {
        &self.groups[entry.group].items[entry.item]
    }

    fn kind(&self, entry: Entry) -> GroupKind {
        self.groups[entry.group].kind
    }

    pub fn groups(&self) -> &[MenuGroup] {
        &self.groups
    }

    /// Absolute index of the focused entry.
    pub fn focus_index(&self) -> Option<usize> {
        self.focus
    }

    pub fn focus(&self) -> MenuFocus {
        match self.focus.map(|i| self.entries[i]) {
            Some(entry) => MenuFocus {
                group: Some(entry.group),
                item: Some(entry.item),
            },
            None => MenuFocus::default(),
        }
    }

    fn set_focus(&mut self, index: Option<usize>) {
        if let Some(index) = index {
            self.focus = Some(index);
            self.top = nav::scroll_to(
                self.top,
                index,
                usize::from(self.list_rows),
                self.entries.len(),
            );
        }
    }

    /// Space on the focused entry. Returns a result when the dialog should end.
    pub fn toggle(&mut self) -> Option<DialogResult> {
        let entry = self.entries[self.focus?];
        match self.kind(entry) {
            GroupKind::Checklist => {
                let item = &mut self.groups[entry.group].items[entry.item];
                item.on = !item.on;
                None
            }
            GroupKind::Radiolist => {
                for (i, item) in self.groups[entry.group].items.iter_mut().enumerate() {
                    item.on = i == entry.item;
                }
                None
            }
            GroupKind::Menu => {
                self.select_menu_item();
                Some(DialogResult::Ok)
            }
            GroupKind::Separator => None,
        }
    }

    /// Mark the focused plain-menu item as the one chosen.
    fn select_menu_item(&mut self) {
        let Some(focus) = self.focus.map(|i| self.entries[i]) else {
            return;
        };
        if self.kind(focus) != GroupKind::Menu {
            return;
        }
        for (g, group) in self.groups.iter_mut().enumerate() {
            if group.kind != GroupKind::Menu {
                continue;
            }
            for (i, item) in group.items.iter_mut().enumerate() {
                item.on = g == focus.group && i == focus.item;
            }
        }
    }

    /// Next entry (after the focus, wrapping) whose name starts with `c`.
    pub fn find_shortcut(&self, c: char, opts: &Options) -> Option<usize> {
        let c = c.to_lowercase().next()?;
        let start = self.focus.map_or(0, |f| f + 1);
        let len = self.entries.len();
        (0..len).map(|n| (start + n) % len).find(|&i| {
            let entry = self.entries[i];
            if entry.separator {
                return false;
            }
            let item = self.item(entry);
            let label = if opts.no_tags { &item.desc } else { &item.name };
            label
                .chars()
                .next()
                .and_then(|first| first.to_lowercase().next())
                == Some(c)
        })
    }

    /// Apply list navigation keys; `Ignored` leaves the key to the button row.
    pub fn handle_list_key(&mut self, opts: &Options, key: KeyEvent) -> Flow {
        let Some(focus) = self.focus else {
            return Flow::Ignored;
        };
        let page = usize::from(self.list_rows.max(1));
        match key.code {
            KeyCode::Up => self.set_focus(nav::prev(&self.entries, focus)),
            KeyCode::Down => self.set_focus(nav::next(&self.entries, focus)),
            KeyCode::Home => self.set_focus(nav::first(&self.entries)),
            KeyCode::End => self.set_focus(nav::last(&self.entries)),
            KeyCode::PageUp => self.set_focus(nav::fast_prev(&self.entries, focus, page)),
            KeyCode::PageDown => self.set_focus(nav::fast_next(&self.entries, focus, page)),
            KeyCode::Char(' ') => {
                if let Some(result) = self.toggle() {
                    return Flow::Exit(result);
                }
            }
            KeyCode::Char(c) if is_plain_char(&key) => match self.find_shortcut(c, opts) {
                Some(index) => self.set_focus(Some(index)),
                None => return Flow::Ignored,
            },
            _ => return Flow::Ignored,
        }
        Flow::Continue
    }

    /// End of dialog: copy state back to `groups` when the result allows it.
    pub fn finish(&mut self, result: DialogResult, opts: &Options, groups: &mut [MenuGroup]) -> MenuFocus {
        if result == DialogResult::Ok {
            self.select_menu_item();
        }
        if result == DialogResult::Ok || opts.report_on_any_exit {
            for (dst, src) in groups.iter_mut().zip(&self.groups) {
                for (d, s) in dst.items.iter_mut().zip(&src.items) {
                    d.on = s.on;
                }
            }
        }
        self.focus()
    }

    fn draw_entry(&self, buf: &mut ratatui::buffer::Buffer, index: usize, y: u16, opts: &Options, theme: &Theme) {
        let inner = Rect::new(self.list_box.x + 1, y, self.list_box.width.saturating_sub(2), 1);
        let right = inner.right();
        let entry = self.entries[index];
        let item = self.item(entry);

        if entry.separator {
            let label = if item.name.is_empty() { &item.desc } else { &item.name };
            let glyphs = draw::Glyphs::for_options(opts);
            draw::hline(buf, inner.x, y, inner.width, glyphs.h, theme.style("separator"));
            let label = truncate_to_width(label, usize::from(inner.width.saturating_sub(2)));
            if !label.is_empty() {
                let w = width16(label) + 2;
                let x = inner.x + (inner.width - w) / 2;
                draw::put_str(buf, x, y, &format!(" {label} "), right, theme.style("separator"));
            }
            return;
        }

        let selected = Some(index) == self.focus;
        let highlight = selected && !(self.visit_items && self.on_buttons);
        let (style, key_style) = if highlight {
            (theme.style("item.selected"), theme.style("tag.key.selected"))
        } else {
            (theme.style("item"), theme.style("tag.key"))
        };
        draw::fill(buf, inner, theme.style("item"));

        let cols = self.columns;
        let mut x = inner.x + 1;
        draw::put_str(buf, x, y, &item.prefix, right, theme.style("item"));
        x += cols.prefix;

        if cols.selector > 0 {
            let mark = match (self.kind(entry), item.on) {
                (GroupKind::Checklist, true) => "[X]",
                (GroupKind::Checklist, false) => "[ ]",
                (GroupKind::Radiolist, true) => "(*)",
                (GroupKind::Radiolist, false) => "( )",
                _ => "",
            };
            draw::put_str(buf, x, y, mark, right, style);
            x += cols.selector;
        }
        let desc_x = if opts.no_tags {
            x + cols.indent
        } else {
            x + cols.indent + cols.name + NAME_GAP
        };
        x += item.depth.saturating_mul(DEPTH_COLS);
        let name = (!opts.no_tags).then_some(&item.name);
        let name_style = if highlight { style } else { theme.style("item") };
        if let Some(name) = name {
            let mut chars = name.chars();
            if let Some(first) = chars.next() {
                let next = draw::put_str(buf, x, y, first.encode_utf8(&mut [0; 4]), right, key_style);
                draw::put_str(buf, next, y, chars.as_str(), right, name_style);
            }
        }
        if !opts.no_items {
            let desc_style = if opts.no_tags { key_style } else { name_style };
            if opts.no_tags {
                let mut chars = item.desc.chars();
                if let Some(first) = chars.next() {
                    let next = draw::put_str(buf, desc_x, y, first.encode_utf8(&mut [0; 4]), right, desc_style);
                    draw::put_str(buf, next, y, chars.as_str(), right, style);
                }
            } else {
                draw::put_str(buf, desc_x, y, &item.desc, right, desc_style);
            }
        }
    }
}

impl DialogWidget for MenuState {
    fn layout(&mut self, dialog: &mut Dialog, opts: &Options, screen: Rect) -> Result<(), DialogError> {
        let count = u16::try_from(self.entries.len()).unwrap_or(u16::MAX);
        let wanted = match self.list_request {
            SizeRequest::Fixed(n) => n,
            SizeRequest::Auto | SizeRequest::Full => count,
        }
        .max(1);
        let content = Content::growing(wanted + 2, 3, self.columns.required() + BOX_COLS)
            .preferring(self.columns.total() + BOX_COLS);
        dialog.place(opts, content, screen)?;

        let body = dialog.body();
        let room = body.height.saturating_sub(2).max(1);
        self.list_rows = match self.list_request {
            SizeRequest::Fixed(n) => n.min(room),
            _ => room,
        };
        self.list_box = Rect::new(
            body.x + 1,
            body.y,
            body.width.saturating_sub(2),
            self.list_rows + 2,
        );
        if let Some(focus) = self.focus {
            self.top = nav::scroll_to(self.top, focus, usize::from(self.list_rows), self.entries.len());
        }
        Ok(())
    }

    fn draw(&self, _dialog: &Dialog, opts: &Options, theme: &Theme, frame: &mut Frame) {
        let buf = frame.buffer_mut();
        let glyphs = draw::Glyphs::for_options(opts);
        let lowered = match opts.border {
            dialog::BorderStyle::Raised => dialog::BorderStyle::Lowered,
            other => other,
        };
        draw::border(buf, self.list_box, lowered, glyphs, theme);
        draw::fill(buf, Rect::new(self.list_box.x + 1, self.list_box.y + 1, self.list_box.width.saturating_sub(2), self.list_rows), theme.style("item"));

        for row in 0..self.list_rows {
            let index = self.top + usize::from(row);
            if index >= self.entries.len() {
                break;
            }
            self.draw_entry(buf, index, self.list_box.y + 1 + row, opts, theme);
        }

        let below = self.top + usize::from(self.list_rows) < self.entries.len();
        draw::scroll_arrows(
            buf,
            self.list_box.x + 2,
            self.list_box.y,
            self.list_box.bottom().saturating_sub(1),
            self.top > 0,
            below,
            theme,
        );

        if let Some(entry) = self.focus.map(|i| self.entries[i]) {
            if opts.item_help {
                if let Some(text) = &self.item(entry).bottom_desc {
                    draw::bottom_line(buf, text, theme);
                }
            }
            let row = self.focus.and_then(|f| f.checked_sub(self.top));
            let row = row.filter(|&r| r < usize::from(self.list_rows));
            if let Some(row) = row.filter(|_| !(self.visit_items && self.on_buttons)) {
                let row = u16::try_from(row).unwrap_or(0);
                let x = self.list_box.x + 2 + self.columns.prefix + if self.columns.selector > 0 { 1 } else { 0 };
                frame.set_cursor_position((x, self.list_box.y + 1 + row));
            }
        }
    }

    fn handle_key(&mut self, dialog: &mut Dialog, opts: &Options, key: KeyEvent) -> Flow {
        if self.visit_items {
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
                    return Flow::Continue;
                }
                KeyCode::Left | KeyCode::Right => return Flow::Continue,
                _ => {}
            }
        }
        self.handle_list_key(opts, key)
    }

    fn buttons_focused(&self) -> bool {
        !self.visit_items || self.on_buttons
    }
}

/// Run a list dialog over `groups`; `on` flags are updated in place.
pub fn mixedlist<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    list_rows: i32,
    groups: &mut [MenuGroup],
) -> Result<MenuOutcome, DialogError> {
    let result = run_list(session, opts, text, rows, cols, list_rows, groups);
    session.record(result)
}

fn run_list<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    list_rows: i32,
    groups: &mut [MenuGroup],
) -> Result<MenuOutcome, DialogError> {
    let mut state = MenuState::new(groups.to_vec(), list_rows, opts);
    let mut dialog = Dialog::new(text, opts, dialog::Buttons::standard(opts), rows, cols);
    let finished = dialog::shell::run(session, opts, &mut dialog, &mut state)?;
    let focus = state.finish(finished.result, opts, groups);
    Ok(Outcome {
        result: finished.result,
        value: focus,
        size: finished.size,
    })
}

fn single<B: Backend>(
    kind: GroupKind,
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    size: (i32, i32, i32),
    items: &mut Vec<MenuItem>,
) -> Result<MenuOutcome, DialogError> {
    let mut groups = [MenuGroup::new(kind, std::mem::take(items))];
    let outcome = mixedlist(session, opts, text, size.0, size.1, size.2, &mut groups);
    let [group] = groups;
    *items = group.items;
    outcome
}

/// Plain menu: choosing an item ends the dialog with that item on.
pub fn menu<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    list_rows: i32,
    items: &mut Vec<MenuItem>,
) -> Result<MenuOutcome, DialogError> {
    single(GroupKind::Menu, session, opts, text, (rows, cols, list_rows), items)
}

pub fn checklist<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    list_rows: i32,
    items: &mut Vec<MenuItem>,
) -> Result<MenuOutcome, DialogError> {
    single(GroupKind::Checklist, session, opts, text, (rows, cols, list_rows), items)
}

pub fn radiolist<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    list_rows: i32,
    items: &mut Vec<MenuItem>,
) -> Result<MenuOutcome, DialogError> {
    single(GroupKind::Radiolist, session, opts, text, (rows, cols, list_rows), items)
}

/// Radiolist whose items are indented by their depth.
pub fn treeview<B: Backend>(
    session: &mut Session<B>,
    opts: &Options,
    text: &str,
    rows: i32,
    cols: i32,
    list_rows: i32,
    items: &mut Vec<MenuItem>,
) -> Result<MenuOutcome, DialogError> {
    radiolist(session, opts, text, rows, cols, list_rows, items)
}
