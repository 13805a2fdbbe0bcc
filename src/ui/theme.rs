//! # Theme System
//!
//! Every color and glyph the dialogs draw with comes from a [`Theme`].
//!
//! ## Overview
//!
//! Drawing code asks the theme for a named property (`"button.active"`,
//! `"bar.filled"`, ...) through [`Theme::property`] or the [`Theme::style`]
//! shortcut, so a theme can be swapped without touching widget code.
//!
//! ## Built-in Themes
//!
//! - **Classic** (default) - the traditional blue screen with gray dialogs
//! - **Catppuccin Mocha** - warm, dark pastel theme
//! - **Monochrome** - attributes only, for terminals without color

use ratatui::style::{Color, Modifier, Style};

/// A typed theme property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeValue {
    Bool(bool),
    Char(char),
    Uint(u32),
    Attr(Style),
}

/// Styles and glyphs used by the dialogs, grouped by semantic role.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Human-readable name, matched case-insensitively by [`Theme::by_name`].
    pub name: &'static str,

    // -- Screen --
    pub screen: Style,
    pub backtitle: Style,
    pub shadow: Style,
    /// Draw shadows at all.
    pub shadow_enabled: bool,

    // -- Frame --
    pub dialog: Style,
    pub title: Style,
    /// Light border edges.
    pub border: Style,
    /// Dark border edges.
    pub border_dark: Style,

    // -- Buttons --
    pub button_active: Style,
    pub button_inactive: Style,
    pub button_key_active: Style,
    pub button_key_inactive: Style,

    // -- Lists --
    pub item: Style,
    pub item_selected: Style,
    pub tag_key: Style,
    pub tag_key_selected: Style,
    pub separator: Style,
    pub item_help: Style,
    pub arrow: Style,
    pub arrow_up: char,
    pub arrow_down: char,

    // -- Forms --
    pub field: Style,
    pub field_active: Style,
    pub field_readonly: Style,

    // -- Bars --
    pub bar_filled: Style,
    pub bar_empty: Style,
    pub status_done: Style,
    pub status_failed: Style,
}

impl Theme {
    /// Return the list of all built-in themes (order = display order).
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Return the default theme (Classic).
    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }

    /// Look up a property by its dotted name.
    pub fn property(&self, key: &str) -> Option<ThemeValue> {
        let attr = |s: Style| Some(ThemeValue::Attr(s));
        match key {
            "screen" => attr(self.screen),
            "backtitle" => attr(self.backtitle),
            "shadow" => attr(self.shadow),
            "shadow.enabled" => Some(ThemeValue::Bool(self.shadow_enabled)),
            "shadow.rows" => Some(ThemeValue::Uint(1)),
            "shadow.cols" => Some(ThemeValue::Uint(2)),
            "dialog" => attr(self.dialog),
            "title" => attr(self.title),
            "border" => attr(self.border),
            "border.dark" => attr(self.border_dark),
            "button.active" => attr(self.button_active),
            "button.inactive" => attr(self.button_inactive),
            "button.key.active" => attr(self.button_key_active),
            "button.key.inactive" => attr(self.button_key_inactive),
            "item" => attr(self.item),
            "item.selected" => attr(self.item_selected),
            "tag.key" => attr(self.tag_key),
            "tag.key.selected" => attr(self.tag_key_selected),
            "separator" => attr(self.separator),
            "item.help" => attr(self.item_help),
            "arrow" => attr(self.arrow),
            "arrow.up" => Some(ThemeValue::Char(self.arrow_up)),
            "arrow.down" => Some(ThemeValue::Char(self.arrow_down)),
            "field" => attr(self.field),
            "field.active" => attr(self.field_active),
            "field.readonly" => attr(self.field_readonly),
            "bar.filled" => attr(self.bar_filled),
            "bar.empty" => attr(self.bar_empty),
            "status.done" => attr(self.status_done),
            "status.failed" => attr(self.status_failed),
            _ => None,
        }
    }

    /// Style for `key`, falling back to the dialog style for unknown or non-style keys.
    pub fn style(&self, key: &str) -> Style {
        match self.property(key) {
            Some(ThemeValue::Attr(style)) => style,
            _ => self.dialog,
        }
    }

    /// Boolean property; unknown or non-boolean keys read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.property(key), Some(ThemeValue::Bool(true)))
    }

    /// Glyph property; unknown or non-glyph keys read as a blank.
    pub fn glyph(&self, key: &str) -> char {
        match self.property(key) {
            Some(ThemeValue::Char(c)) => c,
            _ => ' ',
        }
    }
}

const fn pair(fg: Color, bg: Color) -> Style {
    Style::new().fg(fg).bg(bg)
}

const fn bold(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD)
}

const fn reversed(style: Style) -> Style {
    style.add_modifier(Modifier::REVERSED)
}

// ---------------------------------------------------------------------------
// Built-in theme definitions
// ---------------------------------------------------------------------------

// Catppuccin Mocha palette
const BASE: Color = Color::Rgb(30, 30, 46);
const MANTLE: Color = Color::Rgb(24, 24, 37);
const CRUST: Color = Color::Rgb(17, 17, 27);
const SURFACE0: Color = Color::Rgb(49, 50, 68);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const OVERLAY0: Color = Color::Rgb(108, 112, 134);
const TEXT: Color = Color::Rgb(205, 214, 244);
const BLUE: Color = Color::Rgb(137, 180, 250);
const YELLOW: Color = Color::Rgb(249, 226, 175);
const GREEN: Color = Color::Rgb(166, 227, 161);
const RED: Color = Color::Rgb(243, 139, 168);
const MAUVE: Color = Color::Rgb(203, 166, 247);

static BUILT_IN_THEMES: [Theme; 3] = [
    // 0 - Classic (default)
    Theme {
        name: "Classic",
        screen: pair(Color::Cyan, Color::Blue),
        backtitle: bold(pair(Color::Cyan, Color::Blue)),
        shadow: bold(pair(Color::Black, Color::Black)),
        shadow_enabled: true,
        dialog: pair(Color::Black, Color::Gray),
        title: bold(pair(Color::Blue, Color::Gray)),
        border: bold(pair(Color::White, Color::Gray)),
        border_dark: pair(Color::Black, Color::Gray),
        button_active: bold(pair(Color::White, Color::Blue)),
        button_inactive: pair(Color::Black, Color::Gray),
        button_key_active: bold(pair(Color::Yellow, Color::Blue)),
        button_key_inactive: bold(pair(Color::Red, Color::Gray)),
        item: pair(Color::Black, Color::Gray),
        item_selected: bold(pair(Color::White, Color::Blue)),
        tag_key: bold(pair(Color::Red, Color::Gray)),
        tag_key_selected: bold(pair(Color::Yellow, Color::Blue)),
        separator: bold(pair(Color::Blue, Color::Gray)),
        item_help: pair(Color::Cyan, Color::Blue),
        arrow: bold(pair(Color::Green, Color::Gray)),
        arrow_up: '^',
        arrow_down: 'v',
        field: pair(Color::White, Color::Cyan),
        field_active: bold(pair(Color::White, Color::Blue)),
        field_readonly: pair(Color::Gray, Color::Cyan),
        bar_filled: bold(pair(Color::Gray, Color::Blue)),
        bar_empty: bold(pair(Color::Blue, Color::Gray)),
        status_done: bold(pair(Color::Green, Color::Gray)),
        status_failed: bold(pair(Color::Red, Color::Gray)),
    },
    // 1 - Catppuccin Mocha
    Theme {
        name: "Catppuccin Mocha",
        screen: pair(OVERLAY0, CRUST),
        backtitle: bold(pair(MAUVE, CRUST)),
        shadow: pair(MANTLE, MANTLE),
        shadow_enabled: true,
        dialog: pair(TEXT, BASE),
        title: bold(pair(BLUE, BASE)),
        border: pair(SURFACE1, BASE),
        border_dark: pair(SURFACE0, BASE),
        button_active: bold(pair(BASE, BLUE)),
        button_inactive: pair(TEXT, SURFACE0),
        button_key_active: bold(pair(CRUST, YELLOW)),
        button_key_inactive: bold(pair(YELLOW, SURFACE0)),
        item: pair(TEXT, BASE),
        item_selected: bold(pair(BASE, BLUE)),
        tag_key: bold(pair(YELLOW, BASE)),
        tag_key_selected: bold(pair(CRUST, BLUE)),
        separator: pair(MAUVE, BASE),
        item_help: pair(OVERLAY0, CRUST),
        arrow: pair(GREEN, BASE),
        arrow_up: '↑',
        arrow_down: '↓',
        field: pair(TEXT, SURFACE0),
        field_active: bold(pair(TEXT, SURFACE1)),
        field_readonly: pair(OVERLAY0, SURFACE0),
        bar_filled: bold(pair(BASE, BLUE)),
        bar_empty: pair(BLUE, SURFACE0),
        status_done: bold(pair(GREEN, BASE)),
        status_failed: bold(pair(RED, BASE)),
    },
    // 2 - Monochrome
    Theme {
        name: "Monochrome",
        screen: Style::new(),
        backtitle: bold(Style::new()),
        shadow: Style::new().add_modifier(Modifier::DIM),
        shadow_enabled: false,
        dialog: Style::new(),
        title: bold(Style::new()),
        border: Style::new(),
        border_dark: Style::new(),
        button_active: reversed(Style::new()),
        button_inactive: Style::new(),
        button_key_active: bold(reversed(Style::new())),
        button_key_inactive: Style::new().add_modifier(Modifier::UNDERLINED),
        item: Style::new(),
        item_selected: reversed(Style::new()),
        tag_key: Style::new().add_modifier(Modifier::UNDERLINED),
        tag_key_selected: bold(reversed(Style::new())),
        separator: bold(Style::new()),
        item_help: Style::new(),
        arrow: bold(Style::new()),
        arrow_up: '^',
        arrow_down: 'v',
        field: Style::new().add_modifier(Modifier::UNDERLINED),
        field_active: reversed(Style::new()),
        field_readonly: Style::new().add_modifier(Modifier::DIM),
        bar_filled: reversed(Style::new()),
        bar_empty: Style::new(),
        status_done: bold(Style::new()),
        status_failed: bold(reversed(Style::new())),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    /// Convert a catppuccin color to a ratatui Color via its RGB values.
    fn ctp(color: catppuccin::Color) -> Color {
        Color::Rgb(color.rgb.r, color.rgb.g, color.rgb.b)
    }

    #[test]
    fn test_all_themes_count() {
        assert_eq!(Theme::all().len(), 3);
    }

    #[test]
    fn test_default_is_classic() {
        assert_eq!(Theme::default_theme().name, "Classic");
    }

    #[test]
    fn test_by_name_case_insensitive() {
        assert!(Theme::by_name("classic").is_some());
        assert!(Theme::by_name("CATPPUCCIN MOCHA").is_some());
        assert!(Theme::by_name("monochrome").is_some());
        assert!(Theme::by_name("nonexistent").is_none());
    }

    #[test]
    fn test_catppuccin_mocha_matches_palette() {
        let mocha = catppuccin::PALETTE.mocha.colors;
        let theme = Theme::by_name("Catppuccin Mocha").expect("theme exists");
        assert_eq!(theme.dialog.bg, Some(ctp(mocha.base)));
        assert_eq!(theme.dialog.fg, Some(ctp(mocha.text)));
        assert_eq!(theme.title.fg, Some(ctp(mocha.blue)));
        assert_eq!(theme.tag_key.fg, Some(ctp(mocha.yellow)));
        assert_eq!(theme.status_done.fg, Some(ctp(mocha.green)));
        assert_eq!(theme.status_failed.fg, Some(ctp(mocha.red)));
        assert_eq!(theme.screen.bg, Some(ctp(mocha.crust)));
    }

    #[test]
    fn test_property_types() {
        let theme = Theme::default_theme();
        assert_eq!(
            theme.property("button.active"),
            Some(ThemeValue::Attr(theme.button_active))
        );
        assert_eq!(theme.property("shadow.enabled"), Some(ThemeValue::Bool(true)));
        assert_eq!(theme.property("arrow.up"), Some(ThemeValue::Char('^')));
        assert_eq!(theme.property("shadow.cols"), Some(ThemeValue::Uint(2)));
        assert_eq!(theme.property("no.such.key"), None);
    }

    #[test]
    fn test_style_falls_back_to_dialog() {
        let theme = Theme::default_theme();
        assert_eq!(theme.style("item.selected"), theme.item_selected);
        assert_eq!(theme.style("arrow.up"), theme.dialog);
        assert_eq!(theme.style("bogus"), theme.dialog);
    }

    #[test]
    fn test_flag_and_glyph_lookups() {
        let mono = Theme::by_name("Monochrome").expect("theme exists");
        assert!(!mono.flag("shadow.enabled"));
        assert!(Theme::default_theme().flag("shadow.enabled"));
        assert!(!mono.flag("dialog"));
        assert_eq!(mono.glyph("arrow.down"), 'v');
        assert_eq!(mono.glyph("item"), ' ');
    }

    #[test]
    fn test_all_themes_have_distinct_names() {
        let names: Vec<&str> = Theme::all().iter().map(|t| t.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "duplicate theme names found");
    }
}
