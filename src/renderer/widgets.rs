//! Leaf painters.
//!
//! Each painter receives a canvas covering exactly the leaf's box, so it
//! draws in local coordinates and never worries about clipping.

use std::borrow::Cow;

use crate::binding::Scope;
use crate::config::EngineConfig;
use crate::layout::{char_width, split_columns, string_width, truncate};
use crate::node::{GaugeLeaf, ListLeaf, RowStyles, RuleLeaf, TableLeaf, TextLeaf};
use crate::types::{Cell, Style, TextAlign};
use crate::window::Window;

use super::canvas::Canvas;
use super::cascade::Cascade;
use super::surface::{CellStyle, Surface};

// =============================================================================
// Text
// =============================================================================

pub(super) fn text(
    canvas: &mut Canvas<'_>,
    leaf: &TextLeaf,
    cascade: &Cascade,
    scope: &Scope<'_>,
    config: &EngineConfig,
) {
    let width = canvas.width();
    let local = leaf.style.read(scope);
    let content = leaf.content.read(scope);
    let content = match cascade.resolve(&local).transform {
        Some(transform) => Cow::Owned(transform.apply(&content)),
        None => Cow::Borrowed(content.as_str()),
    };

    let line = truncate(&content, width, config.ellipsis);
    let x = align(leaf.align, string_width(&line), width);
    canvas.write_text(x, 0, &line, cascade.cell_style(&local), width - x);
}

/// Column where content `used` cells wide starts inside `width`.
fn align(align: TextAlign, used: u16, width: u16) -> u16 {
    let slack = width.saturating_sub(used);
    match align {
        TextAlign::Left => 0,
        TextAlign::Center => slack / 2,
        TextAlign::Right => slack,
    }
}

// =============================================================================
// Gauge
// =============================================================================

/// Filled fraction, clamped to `[0, 1]`. A zero or invalid total counts as 1.
pub(crate) fn gauge_ratio(value: f64, total: f64) -> f64 {
    let total = if total.is_finite() && total > 0.0 { total } else { 1.0 };
    let ratio = value / total;
    if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
}

pub(super) fn gauge(
    canvas: &mut Canvas<'_>,
    leaf: &GaugeLeaf,
    cascade: &Cascade,
    scope: &Scope<'_>,
    config: &EngineConfig,
) {
    let width = canvas.width();
    let ratio = gauge_ratio(leaf.value.read(scope), leaf.total.read(scope));
    let local = leaf.style.read(scope);
    let filled_style = cascade.cell_style(&local);
    let empty_style = cascade.cell_style(&leaf.empty_style.over(&local));

    let label = config
        .gauge_label
        .then(|| format!("{:>3}%", (ratio * 100.0).round() as u32))
        .filter(|label| string_width(label) < width);
    let bar = match &label {
        Some(label) => width - string_width(label) - 1,
        None => width,
    };

    let filled = ((ratio * f64::from(bar)).round() as u16).min(bar);
    fill_glyph(canvas, 0, filled, config.gauge_filled, filled_style);
    fill_glyph(canvas, filled, bar - filled, config.gauge_empty, empty_style);

    if let Some(label) = label {
        canvas.write_text(bar + 1, 0, &label, filled_style, width - bar - 1);
    }
}

/// Repeat `glyph` across `len` cells of row 0.
fn fill_glyph(canvas: &mut Canvas<'_>, x: u16, len: u16, glyph: char, style: CellStyle) {
    let step = char_width(glyph);
    if step == 0 {
        return;
    }
    let end = x.saturating_add(len);
    let mut col = x;
    while col.saturating_add(step) <= end {
        canvas.set_cell(col, 0, glyph, style);
        col += step;
    }
}

// =============================================================================
// Rule
// =============================================================================

pub(super) fn rule(
    canvas: &mut Canvas<'_>,
    leaf: &RuleLeaf,
    cascade: &Cascade,
    scope: &Scope<'_>,
    config: &EngineConfig,
) {
    let style = cascade.cell_style(&leaf.style.read(scope));
    let glyph = leaf.glyph.unwrap_or(config.rule_glyph);
    let width = canvas.width();
    fill_glyph(canvas, 0, width, glyph, style);
}

// =============================================================================
// List & Table
// =============================================================================

/// Fit `window` to the painted rows and bring the selection into view.
///
/// A box taller than the window still paints at most `max_visible` rows.
fn scroll(window: Window, rows: u16, total: usize, selected: Option<usize>) -> Window {
    let rows = usize::from(rows).min(window.max_visible());
    let mut view = window.with_max_visible(rows);
    match selected {
        Some(selected) => view.follow(selected, total),
        None => view.clamp(total),
    }
    view
}

/// Style of one row, highlighted when selected.
fn row_style(cascade: &Cascade, local: &Style, styles: &RowStyles, selected: bool) -> CellStyle {
    if selected {
        cascade.cell_style(&styles.selected.over(local))
    } else {
        cascade.cell_style(local)
    }
}

/// Returns the window to store back, with its original capacity.
pub(super) fn list(
    canvas: &mut Canvas<'_>,
    leaf: &ListLeaf,
    window: Window,
    cascade: &Cascade,
    scope: &Scope<'_>,
    config: &EngineConfig,
) -> Window {
    let width = canvas.width();
    let local = leaf.style.read(scope);
    let header = u16::from(leaf.header.is_some());

    if let Some(title) = &leaf.header {
        let style = cascade.cell_style(&leaf.styles.header.over(&local));
        canvas.write_text(0, 0, &truncate(title, width, config.ellipsis), style, width);
    }

    let rows = canvas.height().saturating_sub(header);
    let total = leaf.source.len(scope);
    let selected = leaf.selected.as_ref().map(|s| s.read(scope));
    let view = scroll(window, rows, total, selected);
    let start = view.offset(total);

    leaf.source.visit(scope, view.range(total), &mut |index, element| {
        let y = header + (index - start) as u16;
        let style = row_style(cascade, &local, &leaf.styles, selected == Some(index));
        if selected == Some(index) {
            canvas.fill_rect(0, y, width, 1, Cell::blank(style.bg));
        }
        let label = (leaf.label)(element).unwrap_or_default();
        canvas.write_text(0, y, &truncate(&label, width, config.ellipsis), style, width);
    });

    view.with_max_visible(window.max_visible())
}

pub(super) fn table(
    canvas: &mut Canvas<'_>,
    leaf: &TableLeaf,
    window: Window,
    cascade: &Cascade,
    scope: &Scope<'_>,
    config: &EngineConfig,
) -> Window {
    let width = canvas.width();
    let local = leaf.style.read(scope);
    let specs: Vec<_> = leaf.columns.iter().map(|c| (c.width, c.flex)).collect();
    let widths = split_columns(width, &specs, config.column_gap);

    let mut starts = Vec::with_capacity(widths.len());
    let mut x = 0u16;
    for w in &widths {
        starts.push(x);
        x = x.saturating_add(*w).saturating_add(config.column_gap);
    }

    let header = u16::from(leaf.show_header);
    if leaf.show_header {
        let style = cascade.cell_style(&leaf.styles.header.over(&local));
        for ((column, x), w) in leaf.columns.iter().zip(&starts).zip(&widths) {
            canvas.write_text(*x, 0, &truncate(&column.title, *w, config.ellipsis), style, *w);
        }
    }

    let rows = canvas.height().saturating_sub(header);
    let total = leaf.source.len(scope);
    let selected = leaf.selected.as_ref().map(|s| s.read(scope));
    let view = scroll(window, rows, total, selected);
    let start = view.offset(total);

    leaf.source.visit(scope, view.range(total), &mut |index, element| {
        let y = header + (index - start) as u16;
        let style = row_style(cascade, &local, &leaf.styles, selected == Some(index));
        if selected == Some(index) {
            canvas.fill_rect(0, y, width, 1, Cell::blank(style.bg));
        }
        for ((column, x), w) in leaf.columns.iter().zip(&starts).zip(&widths) {
            let value = (column.read)(element).unwrap_or_default();
            canvas.write_text(*x, y, &truncate(&value, *w, config.ellipsis), style, *w);
        }
    });

    view.with_max_visible(window.max_visible())
}
