//! Paint traversal.
//!
//! Walks a block top-down using the geometry of the current frame. Positions
//! accumulate from the parent's origin, clipping narrows at every container,
//! and the style cascade is passed by reference so siblings never see each
//! other's styles.
//!
//! Overlays are not painted in place. They are queued and flushed after the
//! main tree, each laid out against the whole surface and drawn over a
//! cleared rectangle.

use crate::binding::{ElementSource, Scope};
use crate::layout::{Extent, Frame};
use crate::node::Anchor;
use crate::template::{BlockId, OpKind};
use crate::types::{Cell, ClipRect};

use super::canvas::Canvas;
use super::cascade::Cascade;
use super::surface::Surface;
use super::widgets;

impl Frame<'_> {
    /// Paint the root of `block`, positioned relative to `origin`.
    pub(crate) fn paint_block(
        &mut self,
        block: BlockId,
        origin: (u16, u16),
        clip: ClipRect,
        scope: &Scope<'_>,
        surface: &mut dyn Surface,
    ) {
        let root = self.root_of(block);
        self.paint_op(root, origin, clip, &Cascade::default(), scope, surface);
    }

    fn paint_op(
        &mut self,
        index: usize,
        origin: (u16, u16),
        clip: ClipRect,
        cascade: &Cascade,
        scope: &Scope<'_>,
        surface: &mut dyn Surface,
    ) {
        let ops = self.ops;
        let op = &ops[index];

        if let OpKind::Overlay { visible, .. } = &op.kind {
            if visible.read(scope) {
                self.overlays.push(index as u32);
            }
            return;
        }

        let g = self.geometry[index];
        if !g.visible {
            return;
        }
        let x = origin.0.saturating_add(g.local_x);
        let y = origin.1.saturating_add(g.local_y);
        let rect = ClipRect::new(x, y, g.width, g.height);
        // Containers and branches are still walked so nested overlays queue.
        let structural = op.kind.is_branching() || op.kind.as_container().is_some();
        if rect.intersect(&clip).is_empty() && !structural {
            return;
        }

        match &op.kind {
            OpKind::Container(c) => {
                let cascade = cascade.enter(c.cascade, c.fill);
                let mut canvas = Canvas::new(surface, rect, clip);
                if let Some(fill) = c.fill {
                    canvas.fill_rect(0, 0, g.width, g.height, Cell::blank(fill));
                }
                let border_style = cascade.cell_style(&c.border_style);
                canvas.draw_border(0, 0, g.width, g.height, border_style, c.border);

                let edge = c.border.thickness();
                let inner = ClipRect::new(
                    x.saturating_add(edge),
                    y.saturating_add(edge),
                    g.width.saturating_sub(edge * 2),
                    g.height.saturating_sub(edge * 2),
                )
                .intersect(&clip);
                for child in c.child_indices() {
                    self.paint_op(child, (x, y), inner, &cascade, scope, surface);
                }
            }
            OpKind::Conditional { .. } | OpKind::Switch { .. } => {
                if let Some(block) = g.branch {
                    let root = self.root_of(block);
                    self.paint_op(root, (x, y), clip, cascade, scope, surface);
                }
            }
            OpKind::Iteration { source, body, gap } => {
                self.paint_iteration(&**source, *body, *gap, rect, clip, cascade, scope, surface);
            }
            OpKind::Text(t) => {
                let mut canvas = Canvas::new(surface, rect, clip);
                widgets::text(&mut canvas, t, cascade, scope, self.config);
            }
            OpKind::Gauge(gauge) => {
                let mut canvas = Canvas::new(surface, rect, clip);
                widgets::gauge(&mut canvas, gauge, cascade, scope, self.config);
            }
            OpKind::Rule(r) => {
                let mut canvas = Canvas::new(surface, rect, clip);
                widgets::rule(&mut canvas, r, cascade, scope, self.config);
            }
            OpKind::List(l) => {
                let window = self.window(l.window.as_ref());
                let mut canvas = Canvas::new(surface, rect, clip);
                let next = widgets::list(&mut canvas, l, window, cascade, scope, self.config);
                if let Some(handle) = &l.window {
                    handle.set(next);
                }
            }
            OpKind::Table(t) => {
                let window = self.window(t.window.as_ref());
                let mut canvas = Canvas::new(surface, rect, clip);
                let next = widgets::table(&mut canvas, t, window, cascade, scope, self.config);
                if let Some(handle) = &t.window {
                    handle.set(next);
                }
            }
            OpKind::Custom(c) => (c.paint)(&mut Canvas::new(surface, rect, clip), scope),
            OpKind::Overlay { .. } | OpKind::Empty => {}
        }
    }

    /// Lay out and paint the body once per element, stacked top to bottom.
    #[allow(clippy::too_many_arguments)]
    fn paint_iteration(
        &mut self,
        source: &dyn ElementSource,
        body: BlockId,
        gap: u16,
        rect: ClipRect,
        clip: ClipRect,
        cascade: &Cascade,
        scope: &Scope<'_>,
        surface: &mut dyn Surface,
    ) {
        let root = self.root_of(body);
        let margin_bottom = self.ops[root].hints.margin.bottom;
        let clip = rect.intersect(&clip);
        let mut cursor = rect.y;

        source.visit(scope, 0..usize::MAX, &mut |i, element| {
            if cursor >= clip.bottom() {
                return;
            }
            let inner = scope.enter(element, i);
            self.layout_block(body, Extent::Within(rect.width), Extent::Fit(u16::MAX), &inner);
            let g = self.geometry[root];
            if !g.visible {
                return;
            }
            self.paint_op(root, (rect.x, cursor), clip, cascade, &inner, surface);
            cursor = cursor
                .saturating_add(g.local_y)
                .saturating_add(g.height)
                .saturating_add(margin_bottom)
                .saturating_add(gap);
        });
    }

    // -------------------------------------------------------------------------
    // Overlays
    // -------------------------------------------------------------------------

    /// Paint every queued overlay, including overlays queued by overlays.
    pub(crate) fn paint_overlays(&mut self, surface: &mut dyn Surface) {
        let ops = self.ops;
        let bounds = surface.bounds();
        let scope = Scope::root();

        let mut next = 0;
        while let Some(&index) = self.overlays.get(next) {
            next += 1;
            let index = index as usize;
            let op = &ops[index];
            let OpKind::Overlay { body, anchor, .. } = &op.kind else {
                continue;
            };

            let width = match op.hints.width.resolve(bounds.width) {
                Some(w) => Extent::Exact(w.min(bounds.width)),
                None => Extent::Fit(bounds.width),
            };
            let height = match op.hints.height.resolve(bounds.height) {
                Some(h) => Extent::Exact(h.min(bounds.height)),
                None => Extent::Fit(bounds.height),
            };
            self.layout_block(*body, width, height, &scope);

            let root = self.root_of(*body);
            let g = self.geometry[root];
            if !g.visible {
                continue;
            }
            let margin = ops[root].hints.margin;
            let outer_w = g.local_x.saturating_add(g.width).saturating_add(margin.right);
            let outer_h = g.local_y.saturating_add(g.height).saturating_add(margin.bottom);
            let (x, y) = match *anchor {
                Anchor::Center => (
                    bounds.width.saturating_sub(outer_w) / 2,
                    bounds.height.saturating_sub(outer_h) / 2,
                ),
                Anchor::At(x, y) => (x, y),
            };

            let placed = &mut self.geometry[index];
            placed.local_x = x;
            placed.local_y = y;
            placed.width = outer_w;
            placed.height = outer_h;
            tracing::trace!(op = index, x, y, width = outer_w, height = outer_h, "overlay");

            let area = ClipRect::new(
                x.saturating_add(g.local_x),
                y.saturating_add(g.local_y),
                g.width,
                g.height,
            )
            .intersect(&bounds);
            surface.fill_rect(area.x, area.y, area.width, area.height, Cell::default());
            self.paint_op(root, (x, y), bounds, &Cascade::default(), &scope, surface);
        }
    }
}
