//! FrameBuffer - the reference [`Surface`].
//!
//! A 2D grid of Cells representing what should be displayed on the terminal.
//!
//! # Design Decisions
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing for cache efficiency.
//! - **Alpha blending**: translucent backgrounds blend with the existing cell,
//!   a transparent one keeps it.
//! - **Wide characters**: emoji and CJK glyphs mark the following cell as a
//!   continuation (`char == 0`).

use crate::layout::char_width;
use crate::types::{BorderStyle, Cell, ClipRect, Rgba};

use super::surface::{CellStyle, Surface};

// =============================================================================
// FrameBuffer
// =============================================================================

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a new buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    /// Convert (x, y) to flat index.
    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Raw cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to the default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize the buffer (clears content).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.resize(width as usize * height as usize, Cell::default());
        self.clear();
    }

    /// Glyphs of row `y` as a string; continuation cells are skipped.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        self.cells[start..start + self.width as usize]
            .iter()
            .filter_map(Cell::glyph)
            .collect()
    }

    /// Every row as text, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }

    /// Write one cell, blending the background.
    fn put(&mut self, x: u16, y: u16, char: u32, style: CellStyle) {
        let idx = self.index(x, y);
        let cell = &mut self.cells[idx];
        cell.bg = blend_bg(style.bg, cell.bg);
        cell.char = char;
        cell.fg = style.fg;
        cell.attrs = style.attrs;
    }
}

/// Background after painting `bg` over `under`.
fn blend_bg(bg: Rgba, under: Rgba) -> Rgba {
    if bg.is_opaque() || bg.is_terminal_default() || bg.is_ansi() {
        bg
    } else if bg.is_transparent() {
        under
    } else {
        Rgba::blend(bg, under)
    }
}

// =============================================================================
// Drawing Primitives
// =============================================================================

impl Surface for FrameBuffer {
    #[inline]
    fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    fn height(&self) -> u16 {
        self.height
    }

    fn set_cell(&mut self, x: u16, y: u16, glyph: char, style: CellStyle) {
        if !self.in_bounds(x, y) {
            return;
        }
        self.put(x, y, glyph as u32, style);
        if char_width(glyph) == 2 && x + 1 < self.width {
            // Continuation marker for the right half of a wide glyph
            self.put(x + 1, y, 0, style);
        }
    }

    fn write_text(&mut self, x: u16, y: u16, text: &str, style: CellStyle, max_width: u16) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = x.saturating_add(max_width).min(self.width);
        let mut col = x;

        for ch in text.chars() {
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > limit {
                break;
            }
            self.set_cell(col, y, ch, style);
            col += w;
        }

        col.saturating_sub(x)
    }

    fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, cell: Cell) {
        let x2 = x.saturating_add(width).min(self.width);
        let y2 = y.saturating_add(height).min(self.height);
        if x2 <= x || y2 <= y {
            return;
        }

        for row in y..y2 {
            let start = self.index(x, row);
            let end = self.index(x2, row);
            for target in &mut self.cells[start..end] {
                target.bg = blend_bg(cell.bg, target.bg);
                target.char = cell.char;
                target.fg = cell.fg;
                target.attrs = cell.attrs;
            }
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

        let (horiz, vert, tl, tr, br, bl) = border.chars();
        let x2 = x.saturating_add(width - 1);
        let y2 = y.saturating_add(height - 1);

        // Corners
        self.set_cell(x, y, tl, style);
        self.set_cell(x2, y, tr, style);
        self.set_cell(x2, y2, br, style);
        self.set_cell(x, y2, bl, style);

        // Horizontal edges
        for col in (x + 1)..x2 {
            self.set_cell(col, y, horiz, style);
            self.set_cell(col, y2, horiz, style);
        }

        // Vertical edges
        for row in (y + 1)..y2 {
            self.set_cell(x, row, vert, style);
            self.set_cell(x2, row, vert, style);
        }
    }

    fn blit(&mut self, src: ClipRect, dst_x: u16, dst_y: u16) {
        let src = src.intersect(&self.bounds());
        if src.is_empty() {
            return;
        }

        // Copy out first so overlapping regions read the original cells.
        let mut copy = Vec::with_capacity(src.width as usize * src.height as usize);
        for row in src.y..src.bottom() {
            let start = self.index(src.x, row);
            copy.extend_from_slice(&self.cells[start..start + src.width as usize]);
        }

        for dy in 0..src.height {
            for dx in 0..src.width {
                let (x, y) = (dst_x.saturating_add(dx), dst_y.saturating_add(dy));
                if self.in_bounds(x, y) {
                    let idx = self.index(x, y);
                    self.cells[idx] = copy[dy as usize * src.width as usize + dx as usize];
                }
            }
        }
    }

    fn get_cell(&self, x: u16, y: u16) -> Option<Cell> {
        self.get(x, y).copied()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn style(fg: Rgba) -> CellStyle {
        CellStyle {
            fg,
            ..CellStyle::default()
        }
    }

    #[test]
    fn test_frame_buffer_creation() {
        let buf = FrameBuffer::new(80, 24);
        assert_eq!(buf.width(), 80);
        assert_eq!(buf.height(), 24);
        assert_eq!(buf.cells().len(), 80 * 24);
    }

    #[test]
    fn test_set_cell_out_of_bounds_ignored() {
        let mut buf = FrameBuffer::new(4, 2);
        buf.set_cell(10, 10, 'x', CellStyle::default());
        assert_eq!(buf.lines(), vec!["    ", "    "]);
    }

    #[test]
    fn test_write_text_respects_max_width() {
        let mut buf = FrameBuffer::new(10, 1);
        let used = buf.write_text(1, 0, "hello", style(Rgba::RED), 3);
        assert_eq!(used, 3);
        assert_eq!(buf.row_text(0), " hel      ");
        assert_eq!(buf.get_cell(1, 0).map(|c| c.fg), Some(Rgba::RED));
    }

    #[test]
    fn test_write_text_wide_chars() {
        let mut buf = FrameBuffer::new(5, 1);
        let used = buf.write_text(0, 0, "日本語", CellStyle::default(), 5);
        assert_eq!(used, 4);
        assert_eq!(buf.get_cell(1, 0).map(|c| c.char), Some(0));
        assert_eq!(buf.row_text(0), "日本 ");
    }

    #[test]
    fn test_transparent_bg_keeps_underlying() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.fill_rect(0, 0, 3, 1, Cell::blank(Rgba::BLUE));
        buf.set_cell(1, 0, 'x', CellStyle::default());
        assert_eq!(buf.get_cell(1, 0).map(|c| c.bg), Some(Rgba::BLUE));

        buf.set_cell(2, 0, 'y', CellStyle { bg: Rgba::RED, ..CellStyle::default() });
        assert_eq!(buf.get_cell(2, 0).map(|c| c.bg), Some(Rgba::RED));
    }

    #[test]
    fn test_draw_border() {
        let mut buf = FrameBuffer::new(4, 3);
        buf.draw_border(0, 0, 4, 3, CellStyle::default(), BorderStyle::Single);
        assert_eq!(buf.lines(), vec!["┌──┐", "│  │", "└──┘"]);
    }

    #[test]
    fn test_blit_overlapping() {
        let mut buf = FrameBuffer::new(5, 1);
        buf.write_text(0, 0, "abc", CellStyle::default(), 5);
        buf.blit(ClipRect::new(0, 0, 3, 1), 2, 0);
        assert_eq!(buf.row_text(0), "ababc");
    }

    #[test]
    fn test_resize_clears() {
        let mut buf = FrameBuffer::new(2, 1);
        buf.write_text(0, 0, "ab", CellStyle::default(), 2);
        buf.resize(3, 2);
        assert_eq!(buf.lines(), vec!["   ", "   "]);
    }
}
