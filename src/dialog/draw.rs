//! Cell-level drawing of the dialog frame.
//!
//! All helpers clip against the buffer, so a frame that only partly fits
//! (e.g. right after a shrink) never panics.

use super::buttons::Buttons;
use super::frame::Dialog;
use super::options::{BorderStyle, Options};
use crate::text::{char_width, StyledLine, TextAttrs};
use crate::ui::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};

/// Box-drawing glyph set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    pub h: char,
    pub v: char,
    pub tl: char,
    pub tr: char,
    pub bl: char,
    pub br: char,
    /// Tee joining a horizontal line to the left border.
    pub ltee: char,
    /// Tee joining a horizontal line to the right border.
    pub rtee: char,
}

pub const LINES: Glyphs = Glyphs {
    h: '─',
    v: '│',
    tl: '┌',
    tr: '┐',
    bl: '└',
    br: '┘',
    ltee: '├',
    rtee: '┤',
};

pub const ASCII: Glyphs = Glyphs {
    h: '-',
    v: '|',
    tl: '+',
    tr: '+',
    bl: '+',
    br: '+',
    ltee: '+',
    rtee: '+',
};

impl Glyphs {
    pub fn for_options(opts: &Options) -> &'static Glyphs {
        if opts.ascii_lines {
            &ASCII
        } else {
            &LINES
        }
    }
}

/// Colors selected by `\Z0` .. `\Z7`.
const MARKER_COLORS: [Color; 8] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
];

/// Apply text attributes on top of a base style.
pub fn attrs_style(base: Style, attrs: TextAttrs) -> Style {
    let mut style = base;
    if let Some(c) = attrs.color {
        style = style.fg(MARKER_COLORS[usize::from(c) % MARKER_COLORS.len()]);
    }
    if attrs.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if attrs.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if attrs.reverse {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

pub fn set_char(buf: &mut Buffer, x: u16, y: u16, c: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(c).set_style(style);
    }
}

pub fn fill(buf: &mut Buffer, rect: Rect, style: Style) {
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            set_char(buf, x, y, ' ', style);
        }
    }
}

/// Restyle cells without touching their symbols.
pub fn restyle(buf: &mut Buffer, rect: Rect, style: Style) {
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(style);
            }
        }
    }
}

pub fn hline(buf: &mut Buffer, x: u16, y: u16, len: u16, c: char, style: Style) {
    for dx in 0..len {
        set_char(buf, x.saturating_add(dx), y, c, style);
    }
}

/// Draw `text` starting at `(x, y)` without crossing `right` (exclusive).
///
/// Wide glyphs that would straddle the edge are dropped. Returns the column
/// after the last drawn cell.
pub fn put_str(buf: &mut Buffer, x: u16, y: u16, text: &str, right: u16, style: Style) -> u16 {
    let mut col = x;
    for c in text.chars() {
        let w = u16::try_from(char_width(c)).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if col.saturating_add(w) > right {
            break;
        }
        if !buf.area.contains(Position::new(col, y)) {
            col = col.saturating_add(w);
            continue;
        }
        set_char(buf, col, y, c, style);
        for dx in 1..w {
            if let Some(cell) = buf.cell_mut((col + dx, y)) {
                cell.reset();
                cell.set_style(style);
            }
        }
        col = col.saturating_add(w);
    }
    col
}

/// Draw one wrapped line; attribute markers apply only when `colors` is set.
pub fn put_line(buf: &mut Buffer, x: u16, y: u16, line: &StyledLine, right: u16, base: Style, colors: bool) {
    let mut col = x;
    for span in &line.spans {
        let style = if colors { attrs_style(base, span.attrs) } else { base };
        col = put_str(buf, col, y, &span.text, right, style);
    }
}

/// Paint the screen background and the backtitle.
pub fn screen(buf: &mut Buffer, opts: &Options, theme: &Theme) {
    let area = buf.area;
    fill(buf, area, theme.style("screen"));
    if let Some(backtitle) = &opts.backtitle {
        if area.height >= 2 {
            put_str(buf, area.x + 1, area.y, backtitle, area.right(), theme.style("backtitle"));
            let glyphs = Glyphs::for_options(opts);
            hline(buf, area.x + 1, area.y + 1, area.width.saturating_sub(2), glyphs.h, theme.style("screen"));
        }
    }
}

/// Shadow cells: a strip under the bottom edge and two columns on the right.
pub fn shadow(buf: &mut Buffer, area: Rect, theme: &Theme) {
    let right = Rect::new(area.right(), area.y + 1, 2, area.height);
    let bottom = Rect::new(area.x + 2, area.bottom(), area.width, 1);
    let screen = buf.area;
    for rect in [right, bottom] {
        restyle(buf, rect.intersection(screen), theme.style("shadow"));
    }
}

/// Border box; `light` on the lit edges, `dark` on the others.
pub fn border(buf: &mut Buffer, area: Rect, border: BorderStyle, glyphs: &Glyphs, theme: &Theme) {
    fill(buf, area, theme.style("dialog"));
    if area.width < 2 || area.height < 2 {
        return;
    }
    let (lit, shade) = match border {
        BorderStyle::Raised => (theme.style("border"), theme.style("border.dark")),
        BorderStyle::Lowered => (theme.style("border.dark"), theme.style("border")),
        BorderStyle::None => return,
    };
    let right = area.right() - 1;
    let bottom = area.bottom() - 1;

    set_char(buf, area.x, area.y, glyphs.tl, lit);
    hline(buf, area.x + 1, area.y, area.width - 2, glyphs.h, lit);
    set_char(buf, right, area.y, glyphs.tr, shade);
    for y in area.y + 1..bottom {
        set_char(buf, area.x, y, glyphs.v, lit);
        set_char(buf, right, y, glyphs.v, shade);
    }
    set_char(buf, area.x, bottom, glyphs.bl, lit);
    hline(buf, area.x + 1, bottom, area.width - 2, glyphs.h, shade);
    set_char(buf, right, bottom, glyphs.br, shade);
}

/// Horizontal line across a box, joined to both borders.
pub fn separator(buf: &mut Buffer, area: Rect, y: u16, border: BorderStyle, glyphs: &Glyphs, theme: &Theme) {
    if border == BorderStyle::None || area.width < 2 {
        return;
    }
    let (lit, shade) = match border {
        BorderStyle::Lowered => (theme.style("border"), theme.style("border.dark")),
        _ => (theme.style("border.dark"), theme.style("border")),
    };
    set_char(buf, area.x, y, glyphs.ltee, shade);
    hline(buf, area.x + 1, y, area.width - 2, glyphs.h, lit);
    set_char(buf, area.right() - 1, y, glyphs.rtee, lit);
}

/// Title centered on row `y` of `area`, optionally tied to the border.
pub fn title(buf: &mut Buffer, area: Rect, y: u16, text: &str, ties: bool, glyphs: &Glyphs, theme: &Theme) {
    let room = area.width.saturating_sub(6);
    let label = crate::text::truncate_to_width(text, usize::from(room));
    let w = u16::try_from(crate::text::str_width(label)).unwrap_or(room);
    if w == 0 {
        return;
    }
    let x = area.x + (area.width - w) / 2;
    put_str(buf, x - 1, y, " ", x, theme.style("title"));
    put_str(buf, x, y, label, x + w, theme.style("title"));
    put_str(buf, x + w, y, " ", x + w + 1, theme.style("title"));
    if ties {
        set_char(buf, x - 2, y, glyphs.rtee, theme.style("border"));
        set_char(buf, x + w + 1, y, glyphs.ltee, theme.style("border"));
    }
}

/// Draw the button row; returns the cursor position on the focused hotkey.
pub fn buttons(buf: &mut Buffer, row: Rect, buttons: &Buttons, focused: bool, theme: &Theme) -> Option<(u16, u16)> {
    let mut cursor = None;
    for (i, (button, rect)) in buttons.iter().zip(buttons.layout(row)).enumerate() {
        let active = focused && i == buttons.current_index();
        let (style, key_style) = if active {
            (theme.style("button.active"), theme.style("button.key.active"))
        } else {
            (theme.style("button.inactive"), theme.style("button.key.inactive"))
        };
        fill(buf, rect, style);
        set_char(buf, rect.x, rect.y, '<', style);
        set_char(buf, rect.right().saturating_sub(1), rect.y, '>', style);

        let mut x = rect.x + buttons.label_offset(button);
        let hotkey = button.hotkey_index();
        for (n, c) in button.label.chars().enumerate() {
            let cell_style = if Some(n) == hotkey { key_style } else { style };
            if Some(n) == hotkey && active {
                cursor = Some((x, rect.y));
            }
            x = put_str(buf, x, rect.y, c.encode_utf8(&mut [0; 4]), rect.right() - 1, cell_style);
        }
    }
    cursor
}

/// Up/down scroll markers on a box edge.
pub fn scroll_arrows(buf: &mut Buffer, x: u16, top_y: u16, bottom_y: u16, up: bool, down: bool, theme: &Theme) {
    if up {
        put_str(buf, x, top_y, &format!("{}(-)", theme.glyph("arrow.up")), x + 4, theme.style("arrow"));
    }
    if down {
        put_str(buf, x, bottom_y, &format!("{}(+)", theme.glyph("arrow.down")), x + 4, theme.style("arrow"));
    }
}

/// Help line on the last screen row.
pub fn bottom_line(buf: &mut Buffer, text: &str, theme: &Theme) {
    let area = buf.area;
    if area.height == 0 {
        return;
    }
    let y = area.bottom() - 1;
    fill(buf, Rect::new(area.x, y, area.width, 1), theme.style("item.help"));
    put_str(buf, area.x + 1, y, text, area.right(), theme.style("item.help"));
}

/// Shadow, border, titles, prompt, separator and buttons of `dialog`.
pub fn frame(buf: &mut Buffer, dialog: &Dialog, opts: &Options, theme: &Theme, buttons_focused: bool) -> Option<(u16, u16)> {
    let area = dialog.area();
    let glyphs = Glyphs::for_options(opts);
    if opts.shadow && theme.flag("shadow.enabled") {
        shadow(buf, area, theme);
    }
    border(buf, area, opts.border, glyphs, theme);
    if let Some(text) = &opts.title {
        title(buf, area, area.y, text, opts.title_ties, glyphs, theme);
    }
    if let Some(text) = &opts.bottom_title {
        title(buf, area, area.bottom() - 1, text, opts.title_ties, glyphs, theme);
    }

    let text_area = dialog.text_area();
    for (row, line) in dialog
        .prompt
        .lines(usize::from(text_area.width))
        .skip(dialog.prompt_top)
        .take(usize::from(text_area.height))
        .enumerate()
    {
        let y = text_area.y + u16::try_from(row).unwrap_or(0);
        put_line(buf, text_area.x, y, &line, text_area.right(), theme.style("dialog"), opts.text.colors);
    }

    if !dialog.has_buttons() {
        return None;
    }
    separator(buf, area, dialog.separator_y(), opts.border, glyphs, theme);
    buttons(buf, dialog.button_row(), &dialog.buttons, buttons_focused, theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{TextLayout, TextOptions};

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_put_str_clips_wide_glyph_at_edge() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        let end = put_str(&mut buf, 0, 0, "ab日本", 5, Style::new());
        assert_eq!(end, 4);
        assert_eq!(row(&buf, 0).trim_end(), "ab日");
    }

    #[test]
    fn test_put_str_outside_buffer_is_ignored() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        put_str(&mut buf, 0, 5, "abc", 3, Style::new());
        assert_eq!(row(&buf, 0), "   ");
    }

    #[test]
    fn test_raised_border_and_separator() {
        let theme = Theme::default_theme();
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 4));
        let area = Rect::new(0, 0, 6, 4);
        border(&mut buf, area, BorderStyle::Raised, &LINES, theme);
        separator(&mut buf, area, 2, BorderStyle::Raised, &LINES, theme);
        assert_eq!(row(&buf, 0), "┌────┐");
        assert_eq!(row(&buf, 1), "│    │");
        assert_eq!(row(&buf, 2), "├────┤");
        assert_eq!(row(&buf, 3), "└────┘");
        assert_eq!(Some(buf[(0, 0)].fg), theme.style("border").fg);
        assert_eq!(Some(buf[(5, 3)].fg), theme.style("border.dark").fg);
    }

    #[test]
    fn test_ascii_glyphs() {
        let theme = Theme::default_theme();
        let area = Rect::new(0, 0, 4, 3);
        let mut buf = Buffer::empty(area);
        border(&mut buf, area, BorderStyle::Raised, &ASCII, theme);
        assert_eq!(row(&buf, 0), "+--+");
        assert_eq!(row(&buf, 1), "|  |");
    }

    #[test]
    fn test_title_with_ties() {
        let theme = Theme::default_theme();
        let area = Rect::new(0, 0, 14, 3);
        let mut buf = Buffer::empty(area);
        border(&mut buf, area, BorderStyle::Raised, &LINES, theme);
        title(&mut buf, area, 0, "Menu", true, &LINES, theme);
        assert_eq!(row(&buf, 0), "┌──┤ Menu ├──┐");
    }

    #[test]
    fn test_markers_apply_only_with_colors() {
        let opts = TextOptions {
            colors: true,
            ..TextOptions::default()
        };
        let layout = TextLayout::new("\\Z1red", &opts);
        let line = layout.lines(10).next().expect("one line");

        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        put_line(&mut buf, 0, 0, &line, 10, Style::new(), true);
        assert_eq!(buf[(0, 0)].fg, Color::Red);

        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        put_line(&mut buf, 0, 0, &line, 10, Style::new(), false);
        assert_eq!(buf[(0, 0)].fg, Color::Reset);
    }

    #[test]
    fn test_button_cursor_on_hotkey() {
        let theme = Theme::default_theme();
        let buttons = Buttons::standard(&Options::default());
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        let cursor = self::buttons(&mut buf, area, &buttons, true, theme);
        let row_text = row(&buf, 0);
        assert!(row_text.contains("<   OK   >"));
        assert!(row_text.contains("< Cancel >"));
        // "OK" starts 4 columns into the first button at x = 4
        assert_eq!(cursor, Some((8, 0)));
    }
}
