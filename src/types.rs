//! Core value types shared by the compiler, layout engine and renderer.
//!
//! Everything here is plain `Copy` data: colors, cell attributes, the cell
//! itself, rectangles, size hints and the cascading text style.

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Integers for exact comparison. Alpha 255 = fully opaque, 0 = fully transparent.
/// Special value: r=-1 means "terminal default" (let terminal pick),
/// r=-2 marks an ANSI palette color with the index stored in `g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as i16,
            g: g as i16,
            b: b as i16,
            a: a as i16,
        }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Terminal default color (let terminal decide).
    pub const TERMINAL_DEFAULT: Self = Self {
        r: -1,
        g: -1,
        b: -1,
        a: -1,
    };

    /// Transparent color. As a background it keeps whatever is underneath.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create an ANSI palette color (0-255).
    pub const fn ansi(index: u8) -> Self {
        Self {
            r: -2,
            g: index as i16,
            b: 0,
            a: 255,
        }
    }

    #[inline]
    pub const fn is_terminal_default(&self) -> bool {
        self.r == -1
    }

    #[inline]
    pub const fn is_ansi(&self) -> bool {
        self.r == -2
    }

    /// Get ANSI palette index (only valid if `is_ansi()` returns true).
    #[inline]
    pub const fn ansi_index(&self) -> u8 {
        self.g as u8
    }

    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Alpha blend src over dst (Porter-Duff "over").
    ///
    /// Terminal default and ANSI colors are treated as opaque.
    pub fn blend(src: Self, dst: Self) -> Self {
        if src.is_opaque() || src.is_terminal_default() || src.is_ansi() {
            return src;
        }
        if src.is_transparent() {
            return dst;
        }

        let (dr, dg, db, da) = if dst.is_terminal_default() || dst.is_ansi() {
            (0i32, 0i32, 0i32, 255i32)
        } else {
            (dst.r as i32, dst.g as i32, dst.b as i32, dst.a as i32)
        };

        let sa = src.a as i32;
        let inv_sa = 255 - sa;
        let out_a = sa + (da * inv_sa) / 255;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }

        let channel = |s: i16, d: i32| ((s as i32 * sa) + (d * da * inv_sa / 255)) / out_a;

        Self {
            r: channel(src.r, dr).clamp(0, 255) as i16,
            g: channel(src.g, dg).clamp(0, 255) as i16,
            b: channel(src.b, db).clamp(0, 255) as i16,
            a: out_a.clamp(0, 255) as i16,
        }
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const HIDDEN = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

// =============================================================================
// Cell
// =============================================================================

/// A single terminal cell. The engine's only output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint (32 for space, 0 for the continuation of a wide glyph).
    pub char: u32,
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            char: b' ' as u32,
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }
}

impl Cell {
    /// A blank cell painted with `bg`.
    pub const fn blank(bg: Rgba) -> Self {
        Self {
            char: b' ' as u32,
            fg: Rgba::TERMINAL_DEFAULT,
            bg,
            attrs: Attr::NONE,
        }
    }

    /// The glyph as a `char` (continuation cells yield `None`).
    pub fn glyph(&self) -> Option<char> {
        if self.char == 0 {
            None
        } else {
            char::from_u32(self.char)
        }
    }
}

// =============================================================================
// ClipRect
// =============================================================================

/// An axis-aligned rectangle in surface cells. Also used for clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl ClipRect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection of two rects; an empty rect when they do not overlap.
    pub fn intersect(&self, other: &ClipRect) -> ClipRect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            ClipRect::new(x1, y1, x2 - x1, y2 - y1)
        } else {
            ClipRect::new(x1, y1, 0, 0)
        }
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// A size hint: content-derived, absolute cells, or percentage of the parent.
///
/// ```
/// use spark_template::types::Dimension;
///
/// let width = Dimension::Cells(50);
/// let height = Dimension::Percent(100.0);
/// assert_eq!(width.resolve(80), Some(50));
/// assert_eq!(height.resolve(24), Some(24));
/// assert_eq!(Dimension::Auto.resolve(80), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Sized by content (or by the parent's distribution rules).
    #[default]
    Auto,
    /// Absolute size in terminal cells.
    Cells(u16),
    /// Percentage of the parent's content size (0-100).
    Percent(f32),
}

impl Dimension {
    /// Resolve against the parent's content size. `Auto` has no fixed size.
    pub fn resolve(self, parent: u16) -> Option<u16> {
        match self {
            Dimension::Auto => None,
            Dimension::Cells(n) => Some(n),
            Dimension::Percent(p) => Some((parent as f32 * p / 100.0).floor() as u16),
        }
    }

    #[inline]
    pub fn is_auto(self) -> bool {
        matches!(self, Dimension::Auto)
    }
}

impl From<u16> for Dimension {
    fn from(value: u16) -> Self {
        Self::Cells(value)
    }
}

// =============================================================================
// Edges
// =============================================================================

/// Per-side spacing (margin or padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Edges {
    pub const ZERO: Self = Self::all(0);

    pub const fn all(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    /// Vertical `v` (top/bottom) and horizontal `h` (left/right) spacing.
    pub const fn symmetric(v: u16, h: u16) -> Self {
        Self {
            top: v,
            right: h,
            bottom: v,
            left: h,
        }
    }

    #[inline]
    pub fn horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    #[inline]
    pub fn vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Border glyph sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BorderStyle {
    #[default]
    None = 0,
    /// ─ │ ┌ ┐ └ ┘
    Single = 1,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double = 2,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded = 3,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold = 4,
    /// ┄ ┆ ┌ ┐ └ ┘
    Dashed = 5,
    /// - | + + + +
    Ascii = 6,
}

impl BorderStyle {
    /// Border glyphs: (horizontal, vertical, top_left, top_right, bottom_right, bottom_left)
    pub const fn chars(&self) -> (char, char, char, char, char, char) {
        match self {
            Self::None => (' ', ' ', ' ', ' ', ' ', ' '),
            Self::Single => ('─', '│', '┌', '┐', '┘', '└'),
            Self::Double => ('═', '║', '╔', '╗', '╝', '╚'),
            Self::Rounded => ('─', '│', '╭', '╮', '╯', '╰'),
            Self::Bold => ('━', '┃', '┏', '┓', '┛', '┗'),
            Self::Dashed => ('┄', '┆', '┌', '┐', '┘', '└'),
            Self::Ascii => ('-', '|', '+', '+', '+', '+'),
        }
    }

    /// Cells taken on each side by this border (0 or 1).
    #[inline]
    pub const fn thickness(&self) -> u16 {
        match self {
            Self::None => 0,
            _ => 1,
        }
    }
}

// =============================================================================
// Layout Enums
// =============================================================================

/// Main axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Direction {
    /// Children stacked top to bottom.
    #[default]
    Column = 0,
    /// Children laid out left to right.
    Row = 1,
}

impl Direction {
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row)
    }
}

/// Text alignment inside the leaf's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TextAlign {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Case transform applied to text at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Uppercase,
    Lowercase,
}

impl Transform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Transform::Uppercase => text.to_uppercase(),
            Transform::Lowercase => text.to_lowercase(),
        }
    }
}

// =============================================================================
// Style
// =============================================================================

/// A text style whose unset fields inherit from the enclosing cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    pub attrs: Attr,
    pub transform: Option<Transform>,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: Attr::NONE,
            transform: None,
        }
    }

    pub const fn fg(mut self, color: Rgba) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Rgba) -> Self {
        self.bg = Some(color);
        self
    }

    pub const fn attrs(mut self, attrs: Attr) -> Self {
        self.attrs = attrs;
        self
    }

    pub const fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Merge `self` over an inherited style.
    ///
    /// Attributes accumulate; fg, bg and transform inherit only when unset here.
    pub fn over(&self, inherited: &Style) -> Style {
        Style {
            fg: self.fg.or(inherited.fg),
            bg: self.bg.or(inherited.bg),
            attrs: self.attrs | inherited.attrs,
            transform: self.transform.or(inherited.transform),
        }
    }
}
