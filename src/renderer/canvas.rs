//! Canvas - a translated, clipped view of a [`Surface`].
//!
//! Leaves paint in local coordinates: `(0, 0)` is the leaf's top-left
//! corner. Anything outside the clip rectangle is dropped.

use crate::layout::{char_width, skip_columns};
use crate::types::{BorderStyle, Cell, ClipRect};

use super::surface::{CellStyle, Surface};

/// A rectangular region of a surface with its own coordinate origin.
///
/// Implements [`Surface`] itself, so a canvas can be narrowed further.
pub struct Canvas<'s> {
    surface: &'s mut dyn Surface,
    area: ClipRect,
    clip: ClipRect,
}

impl<'s> Canvas<'s> {
    /// View `area` of `surface`, painting only where `area` and `clip` overlap.
    pub fn new(surface: &'s mut dyn Surface, area: ClipRect, clip: ClipRect) -> Self {
        let clip = area.intersect(&clip).intersect(&surface.bounds());
        Self { surface, area, clip }
    }

    /// The canvas rectangle in surface coordinates.
    #[inline]
    pub fn area(&self) -> ClipRect {
        self.area
    }

    /// The paintable part of the canvas in surface coordinates.
    #[inline]
    pub fn clip(&self) -> ClipRect {
        self.clip
    }

    /// Surface position of local `(x, y)`, if it can be painted.
    fn absolute(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        let ax = self.area.x.checked_add(x)?;
        let ay = self.area.y.checked_add(y)?;
        self.clip.contains(ax, ay).then_some((ax, ay))
    }

    fn translate(&self, rect: ClipRect) -> ClipRect {
        ClipRect::new(
            self.area.x.saturating_add(rect.x),
            self.area.y.saturating_add(rect.y),
            rect.width,
            rect.height,
        )
    }
}

impl Surface for Canvas<'_> {
    #[inline]
    fn width(&self) -> u16 {
        self.area.width
    }

    #[inline]
    fn height(&self) -> u16 {
        self.area.height
    }

    fn set_cell(&mut self, x: u16, y: u16, glyph: char, style: CellStyle) {
        let Some((ax, ay)) = self.absolute(x, y) else {
            return;
        };
        // Both halves of a wide glyph must fit.
        if char_width(glyph) == 2 && ax.saturating_add(1) >= self.clip.right() {
            return;
        }
        self.surface.set_cell(ax, ay, glyph, style);
    }

    fn write_text(&mut self, x: u16, y: u16, text: &str, style: CellStyle, max_width: u16) -> u16 {
        let ay = self.area.y.saturating_add(y);
        if ay < self.clip.y || ay >= self.clip.bottom() {
            return 0;
        }

        let ax = self.area.x.saturating_add(x);
        let end = ax.saturating_add(max_width).min(self.clip.right());
        let (text, start) = if ax < self.clip.x {
            let (rest, pad) = skip_columns(text, self.clip.x - ax);
            (rest, self.clip.x.saturating_add(pad))
        } else {
            (text, ax)
        };
        if start >= end {
            return 0;
        }

        let used = self.surface.write_text(start, ay, text, style, end - start);
        (start - ax).saturating_add(used)
    }

    fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, cell: Cell) {
        let rect = self
            .translate(ClipRect::new(x, y, width, height))
            .intersect(&self.clip);
        if !rect.is_empty() {
            self.surface
                .fill_rect(rect.x, rect.y, rect.width, rect.height, cell);
        }
    }

    fn draw_border(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        style: CellStyle,
        border: BorderStyle,
    ) {
        if width < 2 || height < 2 || border == BorderStyle::None {
            return;
        }

        let rect = self.translate(ClipRect::new(x, y, width, height));
        if rect.intersect(&self.clip) == rect {
            self.surface
                .draw_border(rect.x, rect.y, width, height, style, border);
            return;
        }

        // Partially clipped: cell by cell.
        let (horiz, vert, tl, tr, br, bl) = border.chars();
        let x2 = x.saturating_add(width - 1);
        let y2 = y.saturating_add(height - 1);
        self.set_cell(x, y, tl, style);
        self.set_cell(x2, y, tr, style);
        self.set_cell(x2, y2, br, style);
        self.set_cell(x, y2, bl, style);
        for col in (x + 1)..x2 {
            self.set_cell(col, y, horiz, style);
            self.set_cell(col, y2, horiz, style);
        }
        for row in (y + 1)..y2 {
            self.set_cell(x, row, vert, style);
            self.set_cell(x2, row, vert, style);
        }
    }

    fn blit(&mut self, src: ClipRect, dst_x: u16, dst_y: u16) {
        let from = self.translate(src);
        let to = self.translate(ClipRect::new(dst_x, dst_y, src.width, src.height));

        // Destination cells that may be written, then the matching source.
        let to_visible = to.intersect(&self.clip);
        if to_visible.is_empty() {
            return;
        }
        let shift_x = to_visible.x - to.x;
        let shift_y = to_visible.y - to.y;
        let wanted = ClipRect::new(
            from.x.saturating_add(shift_x),
            from.y.saturating_add(shift_y),
            to_visible.width,
            to_visible.height,
        );
        let readable = wanted.intersect(&self.clip);
        if readable.is_empty() {
            return;
        }

        self.surface.blit(
            readable,
            to_visible.x + (readable.x - wanted.x),
            to_visible.y + (readable.y - wanted.y),
        );
    }

    fn get_cell(&self, x: u16, y: u16) -> Option<Cell> {
        let (ax, ay) = self.absolute(x, y)?;
        self.surface.get_cell(ax, ay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FrameBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canvas_translates() {
        let mut buf = FrameBuffer::new(6, 2);
        {
            let mut canvas = Canvas::new(
                &mut buf,
                ClipRect::new(2, 1, 3, 1),
                ClipRect::new(0, 0, 6, 2),
            );
            assert_eq!(canvas.width(), 3);
            canvas.set_cell(0, 0, 'x', CellStyle::default());
        }
        assert_eq!(buf.lines(), vec!["      ", "  x   "]);
    }

    #[test]
    fn test_canvas_clips_right_edge() {
        let mut buf = FrameBuffer::new(8, 1);
        {
            let mut canvas = Canvas::new(
                &mut buf,
                ClipRect::new(1, 0, 6, 1),
                ClipRect::new(0, 0, 4, 1),
            );
            let used = canvas.write_text(0, 0, "abcdef", CellStyle::default(), 6);
            assert_eq!(used, 3);
        }
        assert_eq!(buf.row_text(0), " abc    ");
    }

    #[test]
    fn test_canvas_clips_left_edge() {
        let mut buf = FrameBuffer::new(6, 1);
        {
            let mut canvas = Canvas::new(
                &mut buf,
                ClipRect::new(0, 0, 6, 1),
                ClipRect::new(2, 0, 4, 1),
            );
            canvas.write_text(0, 0, "abcdef", CellStyle::default(), 6);
        }
        assert_eq!(buf.row_text(0), "  cdef");
    }

    #[test]
    fn test_canvas_drops_rows_outside_clip() {
        let mut buf = FrameBuffer::new(3, 2);
        {
            let mut canvas = Canvas::new(
                &mut buf,
                ClipRect::new(0, 0, 3, 2),
                ClipRect::new(0, 0, 3, 1),
            );
            assert_eq!(canvas.write_text(0, 1, "abc", CellStyle::default(), 3), 0);
            let hash = Cell {
                char: '#' as u32,
                ..Cell::default()
            };
            canvas.fill_rect(0, 0, 3, 2, hash);
        }
        assert_eq!(buf.lines(), vec!["###", "   "]);
    }

    #[test]
    fn test_canvas_partial_border() {
        let mut buf = FrameBuffer::new(4, 3);
        {
            let mut canvas = Canvas::new(
                &mut buf,
                ClipRect::new(0, 0, 4, 3),
                ClipRect::new(0, 0, 4, 2),
            );
            canvas.draw_border(0, 0, 4, 3, CellStyle::default(), BorderStyle::Single);
        }
        assert_eq!(buf.lines(), vec!["┌──┐", "│  │", "    "]);
    }

    #[test]
    fn test_nested_canvas() {
        let mut buf = FrameBuffer::new(5, 1);
        {
            let mut outer = Canvas::new(
                &mut buf,
                ClipRect::new(1, 0, 4, 1),
                ClipRect::new(0, 0, 5, 1),
            );
            let mut inner = Canvas::new(
                &mut outer,
                ClipRect::new(1, 0, 2, 1),
                ClipRect::new(0, 0, 4, 1),
            );
            inner.write_text(0, 0, "xyz", CellStyle::default(), 3);
        }
        assert_eq!(buf.row_text(0), "  xy ");
    }
}
