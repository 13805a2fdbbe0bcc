//! Per-call dialog state: geometry, prompt, buttons and allocated surfaces.

use super::buttons::Buttons;
use super::geometry::{self, Content, BORDERS, BUTTON_ROWS, TEXT_MARGIN};
use super::options::{Options, SizeRequest};
use super::result::DialogSize;
use crate::error::DialogError;
use crate::text::TextLayout;
use ratatui::layout::Rect;

/// Kind of screen region a dialog owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Shadow,
    Frame,
    Text,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub area: Rect,
}

/// A dialog being shown.
///
/// Created before the first draw, re-placed on every resize and released on
/// teardown. Surfaces are released in reverse allocation order.
#[derive(Debug, Clone)]
pub struct Dialog {
    pub prompt: TextLayout,
    pub buttons: Buttons,
    /// First prompt line shown when the prompt overflows its rows.
    pub prompt_top: usize,
    show_buttons: bool,
    rows: SizeRequest,
    cols: SizeRequest,
    area: Rect,
    screen: Rect,
    text_rows: u16,
    body_rows: u16,
    built: bool,
    surfaces: Vec<Surface>,
}

impl Dialog {
    pub fn new(text: &str, opts: &Options, buttons: Buttons, rows: i32, cols: i32) -> Self {
        Self {
            prompt: TextLayout::new(text, &opts.text),
            buttons,
            prompt_top: 0,
            show_buttons: true,
            rows: SizeRequest::from(rows),
            cols: SizeRequest::from(cols),
            area: Rect::default(),
            screen: Rect::default(),
            text_rows: 0,
            body_rows: 0,
            built: false,
            surfaces: Vec::new(),
        }
    }

    /// Dialog without a button row (infobox, gauges).
    pub fn without_buttons(mut self) -> Self {
        self.show_buttons = false;
        self
    }

    /// Compute size and position for `screen` and allocate the surfaces.
    pub fn place(&mut self, opts: &Options, content: Content, screen: Rect) -> Result<(), DialogError> {
        self.release_surfaces();
        self.screen = screen;

        let usable = geometry::usable_area(screen, opts);
        let buttons = self.show_buttons.then_some(&self.buttons);
        let (height, width) = geometry::compute_size(
            self.rows,
            self.cols,
            &self.prompt,
            buttons,
            content,
            usable,
            opts.shadow,
        )?;
        let (y, x) = geometry::compute_position(opts.position, height, width, usable, opts.shadow);
        self.area = Rect::new(x, y, width, height);

        let inner = height - BORDERS - self.button_rows();
        let prompt_lines = u16::try_from(self.prompt.line_count(usize::from(self.text_width())))
            .unwrap_or(u16::MAX);
        self.text_rows = if content.grow {
            prompt_lines.min(inner.saturating_sub(content.min_rows))
        } else {
            inner.saturating_sub(content.rows)
        };
        self.body_rows = inner - self.text_rows;
        self.prompt_top = self
            .prompt_top
            .min(usize::from(prompt_lines.saturating_sub(self.text_rows)));

        tracing::debug!(y, x, height, width, text_rows = self.text_rows, "dialog placed");

        if opts.shadow {
            let shadow = Rect::new(x + 2, y + 1, width, height).intersection(screen);
            if !shadow.is_empty() {
                self.allocate(SurfaceKind::Shadow, shadow)?;
            }
        }
        self.allocate(SurfaceKind::Frame, self.area)?;
        if self.text_rows > 0 {
            self.allocate(SurfaceKind::Text, self.text_area())?;
        }
        if self.body_rows > 0 {
            self.allocate(SurfaceKind::Body, self.body())?;
        }
        Ok(())
    }

    fn allocate(&mut self, kind: SurfaceKind, area: Rect) -> Result<(), DialogError> {
        if area.is_empty() || self.screen.intersection(area) != area {
            return Err(DialogError::Resource(format!(
                "cannot allocate {kind:?} surface at {area:?}"
            )));
        }
        self.surfaces.push(Surface { kind, area });
        Ok(())
    }

    /// Release all surfaces, last allocated first.
    pub fn release_surfaces(&mut self) -> Vec<Surface> {
        let mut released = std::mem::take(&mut self.surfaces);
        released.reverse();
        released
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub(crate) fn mark_built(&mut self) {
        self.built = true;
    }

    pub fn has_buttons(&self) -> bool {
        self.show_buttons
    }

    fn button_rows(&self) -> u16 {
        if self.show_buttons {
            BUTTON_ROWS
        } else {
            0
        }
    }

    /// Screen the dialog was last placed on.
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Outer rectangle, border included.
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn size(&self) -> DialogSize {
        DialogSize {
            rows: self.area.height,
            cols: self.area.width,
        }
    }

    /// Inside of the border.
    pub fn inner(&self) -> Rect {
        Rect::new(
            self.area.x + 1,
            self.area.y + 1,
            self.area.width.saturating_sub(BORDERS),
            self.area.height.saturating_sub(BORDERS),
        )
    }

    fn text_width(&self) -> u16 {
        self.area.width.saturating_sub(BORDERS + 2 * TEXT_MARGIN)
    }

    /// Rows given to the prompt.
    pub fn text_area(&self) -> Rect {
        Rect::new(
            self.area.x + 1 + TEXT_MARGIN,
            self.area.y + 1,
            self.text_width(),
            self.text_rows,
        )
    }

    /// Rows below the prompt, full inner width.
    pub fn body(&self) -> Rect {
        Rect::new(
            self.area.x + 1,
            self.area.y + 1 + self.text_rows,
            self.area.width.saturating_sub(BORDERS),
            self.body_rows,
        )
    }

    /// Number of prompt lines that do not fit.
    pub fn prompt_overflow(&self) -> usize {
        self.prompt
            .line_count(usize::from(self.text_width()))
            .saturating_sub(usize::from(self.text_rows))
    }

    pub fn separator_y(&self) -> u16 {
        self.area.bottom().saturating_sub(3)
    }

    pub fn button_row(&self) -> Rect {
        Rect::new(
            self.area.x + 1,
            self.area.bottom().saturating_sub(2),
            self.area.width.saturating_sub(BORDERS),
            1,
        )
    }
}
