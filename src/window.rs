//! Windowing - a bounded visible slice over a long sequence.
//!
//! Lists and tables never lay out or paint their whole backing sequence. They
//! hold a [`Window`] `{offset, max_visible}` and only the rows in
//! `offset..offset + visible` are painted. The height a windowed leaf
//! contributes to layout is `min(total, max_visible)`, independent of how
//! long the sequence grows.
//!
//! Offsets are clamped to `[0, max(0, total - max_visible)]` on every access,
//! so a stale offset after the sequence shrinks is harmless.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

// =============================================================================
// Window
// =============================================================================

/// Scroll state of a windowed leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    offset: usize,
    max_visible: usize,
}

impl Window {
    /// A window showing at most `max_visible` rows, scrolled to the top.
    pub const fn new(max_visible: usize) -> Self {
        Self {
            offset: 0,
            max_visible,
        }
    }

    /// Largest number of rows shown at once.
    #[inline]
    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    /// Rows actually shown for a sequence of `total` elements.
    #[inline]
    pub fn visible(&self, total: usize) -> usize {
        total.min(self.max_visible)
    }

    /// Largest valid offset for `total` elements.
    #[inline]
    pub fn max_offset(&self, total: usize) -> usize {
        total.saturating_sub(self.max_visible)
    }

    /// The offset, clamped for `total` elements.
    #[inline]
    pub fn offset(&self, total: usize) -> usize {
        self.offset.min(self.max_offset(total))
    }

    /// Element indices currently in view.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.offset(total);
        start..start + self.visible(total)
    }

    /// Rows contributed to layout, plus one for a header.
    pub fn height(&self, total: usize, header: bool) -> u16 {
        let rows = u16::try_from(self.visible(total)).unwrap_or(u16::MAX);
        rows.saturating_add(u16::from(header))
    }

    /// Same offset, different capacity.
    pub fn with_max_visible(self, max_visible: usize) -> Self {
        Self {
            offset: self.offset,
            max_visible,
        }
    }

    /// Store the clamped offset.
    pub fn clamp(&mut self, total: usize) {
        self.offset = self.offset(total);
    }

    /// Jump to `offset` (clamped).
    pub fn scroll_to(&mut self, offset: usize, total: usize) {
        self.offset = offset;
        self.clamp(total);
    }

    /// Move by `delta` rows (clamped). Returns true if the offset changed.
    pub fn scroll_by(&mut self, delta: isize, total: usize) -> bool {
        let current = self.offset(total);
        let next = current.saturating_add_signed(delta).min(self.max_offset(total));
        self.offset = next;
        next != current
    }

    /// Minimal shift that brings `selected` into view.
    pub fn follow(&mut self, selected: usize, total: usize) {
        self.clamp(total);
        if self.max_visible == 0 || total == 0 {
            return;
        }
        let selected = selected.min(total - 1);
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + self.max_visible {
            self.offset = selected + 1 - self.max_visible;
        }
        self.clamp(total);
    }
}

// =============================================================================
// WindowHandle
// =============================================================================

/// Shared window state: the template updates it while painting (following
/// the selection), the application scrolls it between frames.
#[derive(Clone)]
pub struct WindowHandle(Rc<Cell<Window>>);

impl WindowHandle {
    pub fn new(max_visible: usize) -> Self {
        Self(Rc::new(Cell::new(Window::new(max_visible))))
    }

    #[inline]
    pub fn get(&self) -> Window {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, window: Window) {
        self.0.set(window);
    }

    /// Scroll by `delta` rows for a sequence of `total` elements.
    pub fn scroll_by(&self, delta: isize, total: usize) -> bool {
        let mut window = self.get();
        let moved = window.scroll_by(delta, total);
        self.set(window);
        moved
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WindowHandle").field(&self.get()).finish()
    }
}
