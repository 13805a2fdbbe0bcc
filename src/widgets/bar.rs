//! Two-tone percentage bar with a centered label.
//!
//! The label is split where the fill ends, not at its own middle: label
//! cells over the filled part use the filled style, the rest the empty one.

use crate::dialog::draw;
use crate::text::{char_width, str_width};
use crate::ui::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// Where things go on a bar of a given width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarLayout {
    /// Percentage after clamping to 0..=100.
    pub perc: u8,
    /// Filled columns from the left.
    pub fill: u16,
    pub label: String,
    /// Column of the first label cell.
    pub label_x: u16,
}

/// Pure layout of a bar `width` columns wide showing `perc` percent.
pub fn bar_layout(perc: i32, width: u16, label: Option<&str>) -> BarLayout {
    let clamped = perc.clamp(0, 100);
    let fill = u32::from(width) * clamped.unsigned_abs() / 100;
    let label = label.map_or_else(|| format!("{clamped}%"), str::to_string);
    let label_w = u16::try_from(str_width(&label)).unwrap_or(u16::MAX);
    BarLayout {
        perc: u8::try_from(clamped).unwrap_or(100),
        fill: u16::try_from(fill).unwrap_or(width),
        label_x: width.saturating_sub(label_w) / 2,
        label,
    }
}

/// Draw a bar into row `area.y`, `area.width` columns wide.
pub fn draw_bar(buf: &mut Buffer, area: Rect, perc: i32, label: Option<&str>, theme: &Theme) {
    if area.is_empty() {
        return;
    }
    let layout = bar_layout(perc, area.width, label);
    let split = area.x + layout.fill;
    let row = Rect::new(area.x, area.y, area.width, 1);
    draw::fill(buf, row, theme.style("bar.empty"));
    draw::fill(buf, Rect::new(area.x, area.y, layout.fill, 1), theme.style("bar.filled"));

    let mut x = area.x + layout.label_x;
    for c in layout.label.chars() {
        let style = if x < split {
            theme.style("bar.filled")
        } else {
            theme.style("bar.empty")
        };
        let next = draw::put_str(buf, x, area.y, c.encode_utf8(&mut [0; 4]), row.right(), style);
        if next == x && char_width(c) > 0 {
            break;
        }
        x = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        assert_eq!(bar_layout(-20, 10, None), bar_layout(0, 10, None));
        assert_eq!(bar_layout(250, 10, None), bar_layout(100, 10, None));
        assert_eq!(bar_layout(250, 10, None).fill, 10);
        assert_eq!(bar_layout(-1, 10, None).fill, 0);
    }

    #[test]
    fn test_fill_is_floor_of_width_share() {
        assert_eq!(bar_layout(33, 10, None).fill, 3);
        assert_eq!(bar_layout(99, 10, None).fill, 9);
        assert_eq!(bar_layout(50, 7, None).fill, 3);
    }

    #[test]
    fn test_label_is_centered() {
        let layout = bar_layout(50, 10, None);
        assert_eq!(layout.label, "50%");
        assert_eq!(layout.label_x, 3);
        let layout = bar_layout(5, 10, Some("17"));
        assert_eq!(layout.label_x, 4);
    }

    #[test]
    fn test_label_split_at_fill_column() {
        let theme = Theme::default_theme();
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        // fill = 4: label "40%" starts at 3, so '4' is filled and "0%" empty
        draw_bar(&mut buf, area, 40, None, theme);
        assert_eq!(buf[(3, 0)].symbol(), "4");
        assert_eq!(Some(buf[(3, 0)].bg), theme.style("bar.filled").bg);
        assert_eq!(buf[(4, 0)].symbol(), "0");
        assert_eq!(Some(buf[(4, 0)].bg), theme.style("bar.empty").bg);
        assert_eq!(Some(buf[(0, 0)].bg), theme.style("bar.filled").bg);
        assert_eq!(Some(buf[(9, 0)].bg), theme.style("bar.empty").bg);
    }
}
