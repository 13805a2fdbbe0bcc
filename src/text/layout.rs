//! Word wrapping with escape, tab and attribute handling.

use super::width::{char_width, str_width};
use regex::Regex;
use std::sync::OnceLock;

/// How raw text is turned into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    /// Real newlines break lines (otherwise they read as blanks).
    pub cr_wrap: bool,
    /// Two-character `\n` / `\t` escapes are expanded.
    pub nl_expand: bool,
    /// Tabs advance to the next multiple of `tab_len`.
    pub tab_expand: bool,
    pub tab_len: usize,
    /// Strip leading blanks of each paragraph and collapse blank runs.
    pub trim: bool,
    /// Recognize `\Z` attribute markers.
    pub colors: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            cr_wrap: false,
            nl_expand: true,
            tab_expand: false,
            tab_len: 8,
            trim: false,
            colors: false,
        }
    }
}

/// One `\Z` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Color(u8),
    Bold(bool),
    Underline(bool),
    Reverse(bool),
    Reset,
}

impl Marker {
    fn from_selector(c: char) -> Option<Self> {
        match c {
            '0'..='7' => Some(Marker::Color(c as u8 - b'0')),
            'b' => Some(Marker::Bold(true)),
            'B' => Some(Marker::Bold(false)),
            'u' => Some(Marker::Underline(true)),
            'U' => Some(Marker::Underline(false)),
            'r' => Some(Marker::Reverse(true)),
            'R' => Some(Marker::Reverse(false)),
            'n' => Some(Marker::Reset),
            _ => None,
        }
    }
}

/// Attribute state accumulated from markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextAttrs {
    pub color: Option<u8>,
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl TextAttrs {
    fn apply(&mut self, marker: Marker) {
        match marker {
            Marker::Color(c) => self.color = Some(c),
            Marker::Bold(on) => self.bold = on,
            Marker::Underline(on) => self.underline = on,
            Marker::Reverse(on) => self.reverse = on,
            Marker::Reset => *self = TextAttrs::default(),
        }
    }
}

/// A run of text drawn with one attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub attrs: TextAttrs,
    pub text: String,
}

/// One wrapped display line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<Span>,
    /// Display width in columns.
    pub width: usize,
}

impl StyledLine {
    /// The line without attributes.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn push_str(&mut self, attrs: TextAttrs, text: &str) {
        if text.is_empty() {
            return;
        }
        self.width += str_width(text);
        match self.spans.last_mut() {
            Some(last) if last.attrs == attrs => last.text.push_str(text),
            _ => self.spans.push(Span {
                attrs,
                text: text.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Mark(Marker),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word { pieces: Vec<Piece>, width: usize },
    Blank(usize),
    Tab,
    Break,
}

/// Tokenized text, ready to be wrapped at any width.
///
/// Tokenizing happens once; [`TextLayout::lines`] can then be called for as
/// many candidate widths as autosizing needs.
#[derive(Debug, Clone)]
pub struct TextLayout {
    tokens: Vec<Token>,
    tab_expand: bool,
    tab_len: usize,
}

fn leading_blanks() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]+").ok()).as_ref()
}

fn blank_runs() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]{2,}").ok()).as_ref()
}

fn trim_text(raw: &str) -> String {
    let mut text = raw.to_string();
    if let Some(re) = leading_blanks() {
        text = re.replace_all(&text, "").into_owned();
    }
    if let Some(re) = blank_runs() {
        text = re.replace_all(&text, " ").into_owned();
    }
    text
}

struct Tokenizer {
    tokens: Vec<Token>,
    word: Vec<Piece>,
    word_width: usize,
}

impl Tokenizer {
    fn push_char(&mut self, c: char) {
        self.word_width += char_width(c);
        match self.word.last_mut() {
            Some(Piece::Text(s)) => s.push(c),
            _ => self.word.push(Piece::Text(c.to_string())),
        }
    }

    fn push_mark(&mut self, marker: Marker) {
        self.word.push(Piece::Mark(marker));
    }

    fn end_word(&mut self) {
        if !self.word.is_empty() {
            self.tokens.push(Token::Word {
                pieces: std::mem::take(&mut self.word),
                width: self.word_width,
            });
            self.word_width = 0;
        }
    }

    fn push(&mut self, token: Token) {
        self.end_word();
        if let (Token::Blank(n), Some(Token::Blank(prev))) = (&token, self.tokens.last_mut()) {
            *prev += n;
            return;
        }
        self.tokens.push(token);
    }
}

impl TextLayout {
    pub fn new(raw: &str, opts: &TextOptions) -> Self {
        let source = if opts.trim {
            trim_text(raw)
        } else {
            raw.to_string()
        };

        let mut tk = Tokenizer {
            tokens: Vec::new(),
            word: Vec::new(),
            word_width: 0,
        };
        let chars: Vec<char> = source.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            match c {
                '\\' if opts.nl_expand && next == Some('n') => {
                    tk.push(Token::Break);
                    i += 2;
                }
                '\\' if opts.nl_expand && next == Some('t') => {
                    tk.push(Token::Tab);
                    i += 2;
                }
                '\\' if opts.colors && next == Some('Z') => {
                    match chars.get(i + 2).copied().and_then(Marker::from_selector) {
                        Some(marker) => {
                            tk.push_mark(marker);
                            i += 3;
                        }
                        None => {
                            tk.push_char(c);
                            i += 1;
                        }
                    }
                }
                '\n' => {
                    tk.push(if opts.cr_wrap {
                        Token::Break
                    } else {
                        Token::Blank(1)
                    });
                    i += 1;
                }
                '\r' => i += 1,
                '\t' => {
                    tk.push(Token::Tab);
                    i += 1;
                }
                ' ' => {
                    tk.push(Token::Blank(1));
                    i += 1;
                }
                _ => {
                    tk.push_char(c);
                    i += 1;
                }
            }
        }
        tk.end_word();

        if opts.trim {
            // a blank that used to open a paragraph survives as a token after a break
            let mut cleaned = Vec::with_capacity(tk.tokens.len());
            let mut at_start = true;
            for token in tk.tokens {
                match token {
                    Token::Blank(_) | Token::Tab if at_start => {}
                    Token::Blank(_) => cleaned.push(Token::Blank(1)),
                    Token::Break => {
                        at_start = true;
                        cleaned.push(token);
                    }
                    other => {
                        at_start = false;
                        cleaned.push(other);
                    }
                }
            }
            tk.tokens = cleaned;
        }

        Self {
            tokens: tk.tokens,
            tab_expand: opts.tab_expand,
            tab_len: opts.tab_len.max(1),
        }
    }

    /// Wrapped lines at `width` columns. Each call starts from the top.
    pub fn lines(&self, width: usize) -> Lines<'_> {
        Lines {
            layout: self,
            pos: 0,
            width: width.max(1),
            attrs: TextAttrs::default(),
            continuation: false,
        }
    }

    /// Number of lines produced at `width`.
    pub fn line_count(&self, width: usize) -> usize {
        self.lines(width).count()
    }

    /// Widest single word; no width below this avoids overflowing lines.
    pub fn max_word_width(&self) -> usize {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word { width, .. } => Some(*width),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Width of the widest line when nothing is soft-wrapped.
    pub fn natural_width(&self) -> usize {
        self.lines(usize::MAX / 2).map(|l| l.width).max().unwrap_or(0)
    }

    /// Total columns of visible characters, used for aspect-ratio sizing.
    pub fn total_width(&self) -> usize {
        self.tokens
            .iter()
            .map(|t| match t {
                Token::Word { width, .. } => *width,
                Token::Blank(n) => *n,
                Token::Tab => 1,
                Token::Break => 0,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Lazy line iterator over a [`TextLayout`].
pub struct Lines<'a> {
    layout: &'a TextLayout,
    pos: usize,
    width: usize,
    attrs: TextAttrs,
    /// The previous line ended on a soft wrap, so leading blanks are dropped.
    continuation: bool,
}

impl Iterator for Lines<'_> {
    type Item = StyledLine;

    fn next(&mut self) -> Option<StyledLine> {
        let tokens = &self.layout.tokens;
        if self.pos >= tokens.len() {
            return None;
        }

        let mut line = StyledLine::default();
        let mut has_content = false;
        let mut pending = 0usize;

        while let Some(token) = tokens.get(self.pos) {
            match token {
                Token::Break => {
                    self.pos += 1;
                    self.continuation = false;
                    return Some(line);
                }
                Token::Blank(n) => {
                    self.pos += 1;
                    if !(line.width == 0 && self.continuation) {
                        pending += n;
                    }
                }
                Token::Tab => {
                    self.pos += 1;
                    if line.width == 0 && self.continuation {
                        continue;
                    }
                    pending += if self.layout.tab_expand {
                        let col = line.width + pending;
                        self.layout.tab_len - col % self.layout.tab_len
                    } else {
                        1
                    };
                }
                Token::Word { pieces, width } => {
                    if line.width == 0 {
                        // indentation gives way to a word that starts the line
                        pending = pending.min(self.width.saturating_sub(*width));
                    } else if line.width + pending + width > self.width {
                        self.continuation = true;
                        return Some(line);
                    }
                    if pending > 0 {
                        line.push_str(self.attrs, &" ".repeat(pending));
                        pending = 0;
                    }
                    for piece in pieces {
                        match piece {
                            Piece::Text(s) => line.push_str(self.attrs, s),
                            Piece::Mark(m) => self.attrs.apply(*m),
                        }
                    }
                    has_content = true;
                    self.pos += 1;
                    // a word that had to start a fresh line still ends a continuation
                    if line.width > 0 {
                        self.continuation = false;
                    }
                }
            }
        }

        if has_content || line.width > 0 {
            Some(line)
        } else {
            None
        }
    }
}

/// Convenience: wrap `text` at `width` and return plain strings.
pub fn wrap(text: &str, width: usize, opts: &TextOptions) -> Vec<String> {
    TextLayout::new(text, opts)
        .lines(width)
        .map(|l| l.plain())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str, width: usize) -> Vec<String> {
        wrap(text, width, &TextOptions::default())
    }

    #[test]
    fn test_greedy_word_wrap() {
        assert_eq!(
            plain("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_long_word_gets_own_line() {
        assert_eq!(
            plain("a supercalifragilistic b", 8),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn test_leading_blanks_never_overflow() {
        assert_eq!(plain("      word", 6), vec!["  word"]);
        assert_eq!(plain("  word", 10), vec!["  word"]);
        for width in 4..12 {
            for line in plain("        word and more", width) {
                assert!(str_width(&line) <= width, "{line:?} wider than {width}");
            }
        }
    }

    #[test]
    fn test_escaped_newline_forces_break() {
        assert_eq!(plain("one\\ntwo", 40), vec!["one", "two"]);

        let literal = TextOptions {
            nl_expand: false,
            ..TextOptions::default()
        };
        assert_eq!(wrap("one\\ntwo", 40, &literal), vec!["one\\ntwo"]);
    }

    #[test]
    fn test_real_newline_depends_on_cr_wrap() {
        assert_eq!(plain("one\ntwo", 40), vec!["one two"]);

        let cr = TextOptions {
            cr_wrap: true,
            ..TextOptions::default()
        };
        assert_eq!(wrap("one\ntwo", 40, &cr), vec!["one", "two"]);
        assert_eq!(wrap("a\n\nb", 40, &cr), vec!["a", "", "b"]);
    }

    #[test]
    fn test_tab_expansion() {
        let expand = TextOptions {
            tab_expand: true,
            tab_len: 4,
            ..TextOptions::default()
        };
        assert_eq!(wrap("ab\tc", 40, &expand), vec!["ab  c"]);
        assert_eq!(plain("ab\tc", 40), vec!["ab c"]);
    }

    #[test]
    fn test_color_markers_take_no_width() {
        let colors = TextOptions {
            colors: true,
            ..TextOptions::default()
        };
        let layout = TextLayout::new("\\Z1red\\Zn plain", &colors);
        let lines: Vec<StyledLine> = layout.lines(40).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].plain(), "red plain");
        assert_eq!(lines[0].width, 9);
        assert_eq!(lines[0].spans[0].attrs.color, Some(1));
        assert_eq!(lines[0].spans[1].attrs, TextAttrs::default());
    }

    #[test]
    fn test_markers_literal_without_colors() {
        assert_eq!(plain("\\Zbx", 40), vec!["\\Zbx"]);
    }

    #[test]
    fn test_unknown_selector_is_literal() {
        let colors = TextOptions {
            colors: true,
            ..TextOptions::default()
        };
        assert_eq!(wrap("\\Zqx", 40, &colors), vec!["\\Zqx"]);
    }

    #[test]
    fn test_wide_chars_measured_by_columns() {
        // each glyph is two columns, so only two fit per 5-column line
        assert_eq!(plain("日本 語日 本", 5), vec!["日本", "語日", "本"]);
    }

    #[test]
    fn test_trim_collapses_blanks() {
        let trim = TextOptions {
            trim: true,
            cr_wrap: true,
            ..TextOptions::default()
        };
        assert_eq!(wrap("   a    b\n  c", 40, &trim), vec!["a b", "c"]);
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod";
        for width in [8, 13, 20, 31] {
            let first = plain(text, width);
            let joined = first.join("\n");
            let cr = TextOptions {
                cr_wrap: true,
                ..TextOptions::default()
            };
            assert_eq!(wrap(&joined, width, &cr), first, "width {width}");
            assert_eq!(plain(&joined, width), first, "width {width}");
        }
    }

    #[test]
    fn test_line_count_non_increasing_with_width() {
        let text = "Alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let layout = TextLayout::new(text, &TextOptions::default());
        let mut previous = usize::MAX;
        for width in 1..80 {
            let count = layout.line_count(width);
            assert!(count <= previous, "width {width}: {count} > {previous}");
            previous = count;
        }
    }

    #[test]
    fn test_metrics() {
        let layout = TextLayout::new("ab abcdef a", &TextOptions::default());
        assert_eq!(layout.max_word_width(), 6);
        assert_eq!(layout.natural_width(), 11);
        assert_eq!(layout.total_width(), 11);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        let layout = TextLayout::new("", &TextOptions::default());
        assert!(layout.is_empty());
        assert_eq!(layout.line_count(10), 0);
    }

    #[test]
    fn test_lines_are_restartable() {
        let layout = TextLayout::new("one two three", &TextOptions::default());
        let first: Vec<_> = layout.lines(7).collect();
        let second: Vec<_> = layout.lines(7).collect();
        assert_eq!(first, second);
    }
}
