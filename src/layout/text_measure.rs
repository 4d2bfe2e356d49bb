//! Text Measurement
//!
//! Display width of text in terminal cells, via `unicode-width`:
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Zero-width and control characters: 0 cells

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of one character in cells.
#[inline]
pub fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Display width of a string in cells (saturating).
pub fn string_width(s: &str) -> u16 {
    u16::try_from(s.width()).unwrap_or(u16::MAX)
}

/// Cut `text` to at most `width` cells.
///
/// With an ellipsis glyph, a cut string ends in it; the glyph's own width is
/// reserved first. A wide character that would straddle the limit is dropped.
pub fn truncate(text: &str, width: u16, ellipsis: Option<char>) -> Cow<'_, str> {
    if string_width(text) <= width {
        return Cow::Borrowed(text);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let mark = ellipsis.map_or(0, char_width);
    let target = if mark <= width { width - mark } else { width };

    let mut result = String::with_capacity(text.len());
    let mut used = 0u16;
    for c in text.chars() {
        let w = char_width(c);
        if used + w > target {
            break;
        }
        result.push(c);
        used += w;
    }
    if let Some(glyph) = ellipsis.filter(|_| mark <= width) {
        result.push(glyph);
    }
    Cow::Owned(result)
}

/// Drop the leading `columns` cells of `text`.
///
/// Returns the remainder and how many blank cells precede it (a wide
/// character cut in half leaves one blank cell).
pub fn skip_columns(text: &str, columns: u16) -> (&str, u16) {
    let mut skipped = 0u16;
    for (offset, c) in text.char_indices() {
        if skipped >= columns {
            return (&text[offset..], skipped - columns);
        }
        skipped = skipped.saturating_add(char_width(c));
    }
    ("", skipped.saturating_sub(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_string_width_ascii() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width(""), 0);
        assert_eq!(string_width("a b c"), 5);
    }

    #[test]
    fn test_string_width_wide_chars() {
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width("a日b"), 4);
        assert_eq!(char_width('\u{200B}'), 0);
    }

    #[test_case("hello", 10, "hello" ; "fits")]
    #[test_case("hello", 5, "hello" ; "exact")]
    #[test_case("hello world", 6, "hello…" ; "cut with ellipsis")]
    #[test_case("hello", 4, "hel…" ; "one short")]
    #[test_case("hello", 0, "" ; "zero width")]
    #[test_case("日本語", 4, "日…" ; "wide char straddles limit")]
    fn test_truncate(text: &str, width: u16, expected: &str) {
        assert_eq!(truncate(text, width, Some('…')), expected);
    }

    #[test]
    fn test_truncate_without_ellipsis() {
        assert_eq!(truncate("hello world", 5, None), "hello");
        assert_eq!(truncate("hello", 1, Some('…')), "…");
    }

    #[test]
    fn test_skip_columns() {
        assert_eq!(skip_columns("hello", 2), ("llo", 0));
        assert_eq!(skip_columns("hello", 0), ("hello", 0));
        assert_eq!(skip_columns("日本", 1), ("本", 1));
        assert_eq!(skip_columns("ab", 5), ("", 0));
    }
}
