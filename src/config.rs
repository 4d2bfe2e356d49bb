//! Engine configuration.
//!
//! A small value type with sensible defaults. Builders consume and return
//! `self` so a config can be written inline:
//!
//! ```
//! use spark_template::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_constrain_height(false)
//!     .with_gauge_glyphs('#', '.');
//! assert!(!config.constrain_height);
//! ```

/// Knobs that affect layout and leaf painting.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Stretch an `Auto`-height root to the full surface height (fullscreen).
    /// When false the root keeps its content height (inline rendering).
    pub constrain_height: bool,
    /// Glyph for the filled part of a gauge.
    pub gauge_filled: char,
    /// Glyph for the empty part of a gauge.
    pub gauge_empty: char,
    /// Draw a right-aligned percentage label on gauges.
    pub gauge_label: bool,
    /// Glyph used by `rule` leaves.
    pub rule_glyph: char,
    /// Glyph appended when text is truncated. `None` cuts hard.
    pub ellipsis: Option<char>,
    /// Visible rows for lists and tables that don't declare a window.
    pub default_window: u16,
    /// Blank columns between table columns.
    pub column_gap: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            constrain_height: true,
            gauge_filled: '█',
            gauge_empty: '░',
            gauge_label: false,
            rule_glyph: '─',
            ellipsis: Some('…'),
            default_window: 10,
            column_gap: 1,
        }
    }
}

impl EngineConfig {
    pub fn with_constrain_height(mut self, constrain: bool) -> Self {
        self.constrain_height = constrain;
        self
    }

    pub fn with_gauge_glyphs(mut self, filled: char, empty: char) -> Self {
        self.gauge_filled = filled;
        self.gauge_empty = empty;
        self
    }

    pub fn with_gauge_label(mut self, label: bool) -> Self {
        self.gauge_label = label;
        self
    }

    pub fn with_rule_glyph(mut self, glyph: char) -> Self {
        self.rule_glyph = glyph;
        self
    }

    pub fn with_ellipsis(mut self, ellipsis: Option<char>) -> Self {
        self.ellipsis = ellipsis;
        self
    }

    pub fn with_default_window(mut self, rows: u16) -> Self {
        self.default_window = rows;
        self
    }

    pub fn with_column_gap(mut self, gap: u16) -> Self {
        self.column_gap = gap;
        self
    }
}
