//! Size and position computation.
//!
//! Everything here is a pure function of the request, the prompt and the
//! screen, so the shell can rerun it after every resize.

use super::buttons::Buttons;
use super::options::{Options, Position, SizeRequest};
use crate::error::DialogError;
use crate::text::TextLayout;
use ratatui::layout::Rect;

/// Two border lines (top+bottom or left+right).
pub const BORDERS: u16 = 2;
/// Separator line plus the button line.
pub const BUTTON_ROWS: u16 = 2;
/// Blank column on each side of the prompt.
pub const TEXT_MARGIN: u16 = 1;
/// Target width/height ratio when autosizing long prompts.
pub const ASPECT_RATIO: usize = 9;
/// Rows taken by a backtitle and its underline.
pub const BACKTITLE_ROWS: u16 = 2;

/// What a widget needs below the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Content {
    /// Preferred body rows.
    pub rows: u16,
    /// Fewest body rows the widget can work with.
    pub min_rows: u16,
    /// Fewest columns between the borders.
    pub cols: u16,
    /// Columns autosizing aims for; anything past `cols` may be clipped.
    pub pref_cols: u16,
    /// Extra rows from a larger fixed height go to the body instead of the prompt.
    pub grow: bool,
}

impl Content {
    pub fn fixed(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            min_rows: rows,
            cols,
            pref_cols: cols,
            grow: false,
        }
    }

    pub fn growing(rows: u16, min_rows: u16, cols: u16) -> Self {
        Self {
            rows,
            min_rows: min_rows.min(rows),
            cols,
            pref_cols: cols,
            grow: true,
        }
    }

    /// Ask autosizing for `cols` columns while still accepting the minimum.
    pub fn preferring(mut self, cols: u16) -> Self {
        self.pref_cols = cols.max(self.cols);
        self
    }
}

/// Screen area left for the dialog once the backtitle is accounted for.
pub fn usable_area(screen: Rect, opts: &Options) -> Rect {
    if opts.backtitle.is_some() {
        let taken = BACKTITLE_ROWS.min(screen.height);
        Rect::new(screen.x, screen.y + taken, screen.width, screen.height - taken)
    } else {
        screen
    }
}

/// Largest dialog that fits `area`, leaving room for the shadow.
pub fn max_extent(area: Rect, shadow: bool) -> (u16, u16) {
    if shadow {
        (area.height.saturating_sub(1), area.width.saturating_sub(2))
    } else {
        (area.height, area.width)
    }
}

/// Prompt width for autosizing: natural width, narrowed toward the aspect
/// ratio for long text, never below the longest word.
///
/// Text whose widest line takes at most half of `limit` keeps its natural width.
pub fn auto_text_width(prompt: &TextLayout, limit: u16) -> u16 {
    if prompt.is_empty() {
        return 0;
    }
    let natural = prompt.natural_width();
    if natural <= usize::from(limit / 2) {
        return u16::try_from(natural).unwrap_or(u16::MAX);
    }
    let aspect = ((prompt.total_width() * ASPECT_RATIO) as f64).sqrt().ceil() as usize;
    let width = natural.min(aspect.max(prompt.max_word_width()));
    u16::try_from(width).unwrap_or(u16::MAX).min(limit)
}

/// Compute `(rows, cols)` for a dialog.
///
/// Fixed sizes are clamped to the screen; the result is then checked
/// against the minimum implied by `content` and the button row.
pub fn compute_size(
    rows: SizeRequest,
    cols: SizeRequest,
    prompt: &TextLayout,
    buttons: Option<&Buttons>,
    content: Content,
    area: Rect,
    shadow: bool,
) -> Result<(u16, u16), DialogError> {
    let (max_rows, max_cols) = max_extent(area, shadow);
    let button_cols = buttons.map_or(0, |b| b.row_width() + 2 * TEXT_MARGIN);
    let button_rows = if buttons.is_some() { BUTTON_ROWS } else { 0 };
    let min_inner_cols = content.cols.max(button_cols);

    let width = match cols {
        SizeRequest::Full => max_cols,
        SizeRequest::Fixed(n) => n.min(max_cols),
        SizeRequest::Auto => {
            let limit = max_cols.saturating_sub(BORDERS + 2 * TEXT_MARGIN);
            let text = auto_text_width(prompt, limit);
            let text_cols = if text == 0 { 0 } else { text + 2 * TEXT_MARGIN };
            text_cols
                .max(min_inner_cols)
                .max(content.pref_cols)
                .saturating_add(BORDERS)
                .min(max_cols)
        }
    };

    let text_width = usize::from(width.saturating_sub(BORDERS + 2 * TEXT_MARGIN));
    let height = match rows {
        SizeRequest::Full => max_rows,
        SizeRequest::Fixed(n) => n.min(max_rows),
        SizeRequest::Auto => {
            let text_rows = u16::try_from(prompt.line_count(text_width)).unwrap_or(u16::MAX);
            BORDERS
                .saturating_add(text_rows)
                .saturating_add(content.rows)
                .saturating_add(button_rows)
                .min(max_rows)
        }
    };

    check_minimum(
        height,
        width,
        BORDERS + button_rows + content.min_rows,
        BORDERS + min_inner_cols,
    )?;
    Ok((height, width))
}

/// Fail with a sizing error naming the first dimension below its minimum.
pub fn check_minimum(rows: u16, cols: u16, min_rows: u16, min_cols: u16) -> Result<(), DialogError> {
    if rows < min_rows {
        return Err(DialogError::rows(min_rows, rows));
    }
    if cols < min_cols {
        return Err(DialogError::cols(min_cols, cols));
    }
    Ok(())
}

/// Top-left corner `(y, x)` of a dialog of the given size.
///
/// Fixed positions are pulled back so the dialog and its shadow stay on screen.
pub fn compute_position(position: Position, rows: u16, cols: u16, area: Rect, shadow: bool) -> (u16, u16) {
    let (shadow_rows, shadow_cols) = if shadow { (1, 2) } else { (0, 0) };
    let free_rows = area.height.saturating_sub(rows + shadow_rows);
    let free_cols = area.width.saturating_sub(cols + shadow_cols);
    match position {
        Position::Centered => (area.y + free_rows / 2, area.x + free_cols / 2),
        Position::At { y, x } => (
            area.y + y.saturating_sub(area.y).min(free_rows),
            area.x + x.saturating_sub(area.x).min(free_cols),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::Options;
    use crate::text::TextOptions;

    fn prompt(text: &str) -> TextLayout {
        TextLayout::new(text, &TextOptions::default())
    }

    fn screen() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    #[test]
    fn test_auto_size_short_prompt() {
        let buttons = Buttons::standard(&Options::default());
        let (rows, cols) = compute_size(
            SizeRequest::Auto,
            SizeRequest::Auto,
            &prompt("Hello"),
            Some(&buttons),
            Content::default(),
            screen(),
            true,
        )
        .unwrap();
        // border + one text line + separator/buttons + border
        assert_eq!(rows, 5);
        // button row is wider than the prompt
        assert_eq!(cols, buttons.row_width() + 2 * TEXT_MARGIN + BORDERS);
    }

    #[test]
    fn test_auto_width_follows_aspect_ratio() {
        let long = "word ".repeat(60);
        let layout = prompt(&long);
        let width = auto_text_width(&layout, 200);
        assert!(width < 80);
        assert!(usize::from(width) >= layout.max_word_width());
    }

    #[test]
    fn test_auto_width_never_below_longest_word() {
        let layout = prompt("a b c supercalifragilistic d");
        assert_eq!(auto_text_width(&layout, 50), 20);
        let layout = prompt("tiny supercalifragilistic");
        assert!(auto_text_width(&layout, 200) >= 20);
    }

    #[test]
    fn test_short_prompt_keeps_natural_width() {
        let layout = prompt("Hello there");
        assert_eq!(auto_text_width(&layout, 74), 11);

        let (rows, cols) = compute_size(
            SizeRequest::Auto,
            SizeRequest::Auto,
            &layout,
            None,
            Content::default(),
            screen(),
            true,
        )
        .unwrap();
        assert_eq!(rows, 3);
        assert_eq!(cols, 11 + 2 * TEXT_MARGIN + BORDERS);
    }

    #[test]
    fn test_full_screen_leaves_room_for_shadow() {
        let (rows, cols) = compute_size(
            SizeRequest::Full,
            SizeRequest::Full,
            &prompt(""),
            None,
            Content::default(),
            screen(),
            true,
        )
        .unwrap();
        assert_eq!((rows, cols), (23, 78));
    }

    #[test]
    fn test_fixed_size_is_clamped_to_screen() {
        let (rows, cols) = compute_size(
            SizeRequest::Fixed(100),
            SizeRequest::Fixed(200),
            &prompt("x"),
            None,
            Content::default(),
            screen(),
            false,
        )
        .unwrap();
        assert_eq!((rows, cols), (24, 80));
    }

    #[test]
    fn test_too_small_reports_dimension() {
        let err = compute_size(
            SizeRequest::Fixed(4),
            SizeRequest::Auto,
            &prompt("x"),
            None,
            Content::fixed(6, 10),
            screen(),
            false,
        )
        .unwrap_err();
        assert_eq!(err, DialogError::rows(8, 4));

        let err = compute_size(
            SizeRequest::Auto,
            SizeRequest::Auto,
            &prompt("x"),
            None,
            Content::fixed(1, 120),
            screen(),
            false,
        )
        .unwrap_err();
        assert_eq!(err, DialogError::cols(122, 80));
    }

    #[test]
    fn test_preferred_width_is_capped_not_required() {
        let content = Content::fixed(1, 20).preferring(300);
        let (_, cols) = compute_size(
            SizeRequest::Auto,
            SizeRequest::Auto,
            &prompt("x"),
            None,
            content,
            screen(),
            false,
        )
        .unwrap();
        assert_eq!(cols, 80);
    }

    #[test]
    fn test_backtitle_reserves_rows() {
        let opts = Options {
            backtitle: Some("Setup".to_string()),
            ..Options::default()
        };
        assert_eq!(usable_area(screen(), &opts), Rect::new(0, 2, 80, 22));
        assert_eq!(usable_area(screen(), &Options::default()), screen());
    }

    #[test]
    fn test_centered_position() {
        let (y, x) = compute_position(Position::Centered, 10, 40, screen(), false);
        assert_eq!((y, x), (7, 20));
        let (y, x) = compute_position(Position::Centered, 10, 40, screen(), true);
        assert_eq!((y, x), (6, 19));
    }

    #[test]
    fn test_fixed_position_stays_on_screen() {
        let at = Position::At { y: 20, x: 70 };
        let (y, x) = compute_position(at, 10, 40, screen(), true);
        assert_eq!((y, x), (13, 38));
        let (y, x) = compute_position(Position::At { y: 1, x: 2 }, 5, 5, screen(), true);
        assert_eq!((y, x), (1, 2));
    }
}
