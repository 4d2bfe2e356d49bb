//! Style cascade - inherited text style and background fill.

use crate::types::{Rgba, Style};

use super::surface::CellStyle;

/// Style and fill inherited from enclosing containers.
///
/// Passed down by reference while painting, so a container's cascade only
/// ever reaches its own descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cascade {
    pub style: Style,
    pub fill: Option<Rgba>,
}

impl Cascade {
    /// The cascade seen by the children of a container declaring `style`
    /// and `fill`.
    pub fn enter(&self, style: Option<Style>, fill: Option<Rgba>) -> Cascade {
        Cascade {
            style: style.map_or(self.style, |s| s.over(&self.style)),
            fill: fill.or(self.fill),
        }
    }

    /// `local` merged over the inherited style.
    #[inline]
    pub fn resolve(&self, local: &Style) -> Style {
        local.over(&self.style)
    }

    /// Cell colors and attributes for text styled `local`.
    pub fn cell_style(&self, local: &Style) -> CellStyle {
        let style = self.resolve(local);
        CellStyle {
            fg: style.fg.unwrap_or(Rgba::TERMINAL_DEFAULT),
            bg: style.bg.or(self.fill).unwrap_or(Rgba::TRANSPARENT),
            attrs: style.attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attr;

    #[test]
    fn test_enter_merges_over_parent() {
        let bold_red = Style::new().fg(Rgba::RED).attrs(Attr::BOLD);
        let root = Cascade::default().enter(Some(bold_red), None);
        let inner = root.enter(Some(Style::new().attrs(Attr::ITALIC)), Some(Rgba::BLUE));

        assert_eq!(inner.style.fg, Some(Rgba::RED));
        assert_eq!(inner.style.attrs, Attr::BOLD | Attr::ITALIC);
        assert_eq!(inner.fill, Some(Rgba::BLUE));
        // The parent is untouched.
        assert_eq!(root.style.attrs, Attr::BOLD);
        assert_eq!(root.fill, None);
    }

    #[test]
    fn test_cell_style_defaults() {
        let cell = Cascade::default().cell_style(&Style::new());
        assert_eq!(cell, CellStyle::default());
    }

    #[test]
    fn test_cell_style_uses_fill_when_bg_unset() {
        let cascade = Cascade::default().enter(None, Some(Rgba::GRAY));
        assert_eq!(cascade.cell_style(&Style::new()).bg, Rgba::GRAY);
        assert_eq!(cascade.cell_style(&Style::new().bg(Rgba::RED)).bg, Rgba::RED);
    }
}
