//! The cell-grid contract the renderer paints through.

use crate::types::{Attr, BorderStyle, Cell, ClipRect, Rgba};

/// A fully resolved style for painting cells.
///
/// A [`Rgba::TRANSPARENT`] background keeps whatever is already underneath;
/// other translucent backgrounds blend with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: Attr,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TRANSPARENT,
            attrs: Attr::NONE,
        }
    }
}

/// A grid of terminal cells.
///
/// Coordinates outside the surface are ignored, never an error.
pub trait Surface {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// Paint one glyph.
    fn set_cell(&mut self, x: u16, y: u16, glyph: char, style: CellStyle);

    /// Paint `text` starting at `(x, y)`, using at most `max_width` cells.
    /// Returns the number of cells used.
    fn write_text(&mut self, x: u16, y: u16, text: &str, style: CellStyle, max_width: u16) -> u16;

    /// Overwrite a rectangle with `cell`.
    fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, cell: Cell);

    /// Draw a box outline along the edge of a rectangle.
    fn draw_border(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        style: CellStyle,
        border: BorderStyle,
    );

    /// Copy the cells of `src` so its top-left lands at `(dst_x, dst_y)`.
    fn blit(&mut self, src: ClipRect, dst_x: u16, dst_y: u16);

    fn get_cell(&self, x: u16, y: u16) -> Option<Cell>;

    /// Whole-surface rectangle.
    fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width(), self.height())
    }
}
