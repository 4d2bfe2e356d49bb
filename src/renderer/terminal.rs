//! Differential terminal presenter.
//!
//! Compares each frame to the previous one and only writes cells that
//! changed, through crossterm commands queued on any `Write`:
//!
//! 1. Wrap output in a synchronized update
//! 2. For each changed cell: move the cursor if it is not already there,
//!    switch colors and attributes only when they differ from the last cell
//!    written, print the glyph
//! 3. Flush once
//! 4. Keep the frame for the next comparison

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::queue;

use crate::layout::char_width;
use crate::types::{Attr, Cell, Rgba};

use super::buffer::FrameBuffer;
use super::surface::Surface;

/// Writes [`FrameBuffer`]s to a terminal, diffing against the last frame.
pub struct TerminalRenderer<W: Write> {
    out: W,
    previous: Option<FrameBuffer>,
}

/// Pen state of the terminal while writing a frame.
#[derive(Default)]
struct Pen {
    cursor: Option<(u16, u16)>,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
    attrs: Option<Attr>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
        }
    }

    /// Write the cells that changed since the last frame.
    ///
    /// Returns the number of cells written. A size change forces a full redraw.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<usize> {
        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == buffer.width() && p.height() == buffer.height());

        let written = self.write_frame(buffer, previous.as_ref())?;
        self.previous = Some(buffer.clone());
        Ok(written)
    }

    /// Redraw every cell (no diffing).
    ///
    /// Use this after a resize or when the screen is corrupted.
    pub fn render_full(&mut self, buffer: &FrameBuffer) -> io::Result<usize> {
        let written = self.write_frame(buffer, None)?;
        self.previous = Some(buffer.clone());
        Ok(written)
    }

    /// Forget the previous frame; the next render redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Switch to the alternate screen and hide the cursor.
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.out.flush()?;
        self.invalidate();
        Ok(())
    }

    /// Restore the main screen and the cursor.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            Show,
            LeaveAlternateScreen
        )?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(
        &mut self,
        buffer: &FrameBuffer,
        previous: Option<&FrameBuffer>,
    ) -> io::Result<usize> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut pen = Pen::default();
        let mut written = 0;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let unchanged = previous
                    .and_then(|p| p.get(x, y))
                    .is_some_and(|p| cells_equal(p, cell));
                // Right halves of wide glyphs are drawn by their left half.
                if unchanged || cell.char == 0 {
                    continue;
                }
                self.write_cell(&mut pen, x, y, cell)?;
                written += 1;
            }
        }

        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            EndSynchronizedUpdate
        )?;
        self.out.flush()?;
        Ok(written)
    }

    fn write_cell(&mut self, pen: &mut Pen, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if pen.cursor != Some((x, y)) {
            queue!(self.out, MoveTo(x, y))?;
        }

        if pen.attrs != Some(cell.attrs) {
            // Attribute reset also resets colors.
            queue!(self.out, SetAttribute(Attribute::Reset))?;
            for attribute in attributes(cell.attrs) {
                queue!(self.out, SetAttribute(attribute))?;
            }
            pen.attrs = Some(cell.attrs);
            pen.fg = None;
            pen.bg = None;
        }
        if pen.fg != Some(cell.fg) {
            queue!(self.out, SetForegroundColor(color(cell.fg)))?;
            pen.fg = Some(cell.fg);
        }
        if pen.bg != Some(cell.bg) {
            queue!(self.out, SetBackgroundColor(color(cell.bg)))?;
            pen.bg = Some(cell.bg);
        }

        let glyph = cell.glyph().unwrap_or(' ');
        queue!(self.out, Print(glyph))?;
        pen.cursor = Some((x.saturating_add(char_width(glyph).max(1)), y));
        Ok(())
    }
}

/// Fast cell equality check.
#[inline]
fn cells_equal(a: &Cell, b: &Cell) -> bool {
    a.char == b.char && a.attrs == b.attrs && a.fg == b.fg && a.bg == b.bg
}

/// Crossterm color for an [`Rgba`]. Alpha is dropped; a fully transparent
/// color falls back to the terminal default.
fn color(rgba: Rgba) -> Color {
    if rgba.is_terminal_default() || rgba.is_transparent() {
        Color::Reset
    } else if rgba.is_ansi() {
        Color::AnsiValue(rgba.ansi_index())
    } else {
        Color::Rgb {
            r: rgba.r.clamp(0, 255) as u8,
            g: rgba.g.clamp(0, 255) as u8,
            b: rgba.b.clamp(0, 255) as u8,
        }
    }
}

fn attributes(attrs: Attr) -> impl Iterator<Item = Attribute> {
    const MAP: [(Attr, Attribute); 8] = [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::BLINK, Attribute::SlowBlink),
        (Attr::INVERSE, Attribute::Reverse),
        (Attr::HIDDEN, Attribute::Hidden),
        (Attr::STRIKETHROUGH, Attribute::CrossedOut),
    ];
    MAP.into_iter()
        .filter(move |(flag, _)| attrs.contains(*flag))
        .map(|(_, attribute)| attribute)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CellStyle;

    #[test]
    fn test_cells_equal() {
        let a = Cell {
            char: 'X' as u32,
            fg: Rgba::WHITE,
            bg: Rgba::BLACK,
            attrs: Attr::BOLD,
        };
        assert!(cells_equal(&a, &a));
        let b = Cell {
            char: 'Y' as u32,
            ..a
        };
        assert!(!cells_equal(&a, &b));
    }

    #[test]
    fn test_first_render_writes_every_cell() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        let buffer = FrameBuffer::new(4, 2);
        assert_eq!(renderer.render(&buffer).ok(), Some(8));
        assert!(renderer.has_previous());
    }

    #[test]
    fn test_second_render_writes_only_changes() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        let mut buffer = FrameBuffer::new(4, 2);
        assert!(renderer.render(&buffer).is_ok());

        buffer.write_text(1, 1, "ab", CellStyle::default(), 2);
        assert_eq!(renderer.render(&buffer).ok(), Some(2));
        assert_eq!(renderer.render(&buffer).ok(), Some(0));
    }

    #[test]
    fn test_invalidate_and_resize_redraw_everything() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        let buffer = FrameBuffer::new(3, 1);
        assert!(renderer.render(&buffer).is_ok());

        renderer.invalidate();
        assert!(!renderer.has_previous());
        assert_eq!(renderer.render(&buffer).ok(), Some(3));

        let bigger = FrameBuffer::new(5, 1);
        assert_eq!(renderer.render(&bigger).ok(), Some(5));
    }

    #[test]
    fn test_output_contains_glyphs() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        let mut buffer = FrameBuffer::new(5, 1);
        buffer.write_text(0, 0, "hi", CellStyle::default(), 5);
        assert!(renderer.render_full(&buffer).is_ok());

        let out = String::from_utf8(renderer.into_inner()).unwrap_or_default();
        assert!(out.contains("hi"));
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(color(Rgba::TERMINAL_DEFAULT), Color::Reset);
        assert_eq!(color(Rgba::ansi(4)), Color::AnsiValue(4));
        assert_eq!(color(Rgba::rgb(1, 2, 3)), Color::Rgb { r: 1, g: 2, b: 3 });
    }

    #[test]
    fn test_attribute_mapping() {
        let mapped: Vec<_> = attributes(Attr::BOLD | Attr::UNDERLINE).collect();
        assert_eq!(mapped, vec![Attribute::Bold, Attribute::Underlined]);
    }
}
