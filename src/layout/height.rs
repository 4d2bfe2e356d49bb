//! Height pass (bottom-up) and child placement.

use crate::binding::{ElementSource, Scope};
use crate::template::{BlockId, ContainerOp, OpKind};
use crate::types::Dimension;
use crate::window::{Window, WindowHandle};

use super::{Extent, Frame};

impl Frame<'_> {
    pub(super) fn height_pass(&mut self, block: BlockId, scope: &Scope<'_>) {
        let blocks = self.blocks;
        for level in blocks[block.index()].levels.iter().rev() {
            for index in level.start as usize..level.end as usize {
                if self.geometry[index].visible {
                    self.measure_height(index, scope);
                }
            }
        }
    }

    fn measure_height(&mut self, index: usize, scope: &Scope<'_>) {
        let ops = self.ops;
        let op = &ops[index];
        let width = self.geometry[index].width;

        let content = match &op.kind {
            OpKind::Container(c) => self.stack_height(c).saturating_add(c.inset_y()),
            OpKind::Text(_) | OpKind::Gauge(_) | OpKind::Rule(_) => 1,
            OpKind::List(l) => {
                let total = l.source.len(scope);
                self.window(l.window.as_ref()).height(total, l.header.is_some())
            }
            OpKind::Table(t) => {
                let total = t.source.len(scope);
                self.window(t.window.as_ref()).height(total, t.show_header)
            }
            OpKind::Custom(c) => (c.measure)(width, scope),
            OpKind::Conditional { .. } | OpKind::Switch { .. } => {
                match self.geometry[index].branch {
                    Some(block) => self.geometry[self.root_of(block)].height,
                    None => 0,
                }
            }
            OpKind::Iteration { source, body, gap } => {
                self.iteration_height(&**source, *body, *gap, width, scope)
            }
            OpKind::Overlay { .. } | OpKind::Empty => 0,
        };

        let g = &mut self.geometry[index];
        g.content_height = content;
        g.height = match op.hints.height {
            // A branch root already applied its own override.
            Dimension::Cells(n) if !op.kind.is_branching() => n,
            _ => content,
        };

        if let OpKind::Container(c) = &op.kind {
            self.place_children(c);
        }
    }

    /// Visible children stacked along the main axis (column) or the tallest
    /// child (row), margins included.
    fn stack_height(&self, c: &ContainerOp) -> u16 {
        let row = c.direction.is_row();
        let mut total = 0u16;
        let mut count = 0u16;
        for child in c.child_indices() {
            if !self.geometry[child].visible {
                continue;
            }
            let outer = self.geometry[child]
                .height
                .saturating_add(self.hints(child).margin.vertical());
            total = if row { total.max(outer) } else { total.saturating_add(outer) };
            count += 1;
        }
        if !row {
            total = total.saturating_add(c.gap.saturating_mul(count.saturating_sub(1)));
        }
        total
    }

    /// Sum of the body heights of every element, plus gaps between them.
    fn iteration_height(
        &mut self,
        source: &dyn ElementSource,
        body: BlockId,
        gap: u16,
        width: u16,
        scope: &Scope<'_>,
    ) -> u16 {
        let root = self.root_of(body);
        let margin_bottom = self.ops[root].hints.margin.bottom;
        let mut total = 0u16;
        let mut count = 0u16;
        source.visit(scope, 0..usize::MAX, &mut |i, element| {
            let inner = scope.enter(element, i);
            self.layout_block(body, Extent::Within(width), Extent::Fit(u16::MAX), &inner);
            let g = self.geometry[root];
            if g.visible {
                let advance = g.local_y.saturating_add(g.height).saturating_add(margin_bottom);
                total = total.saturating_add(advance);
                count += 1;
            }
        });
        total.saturating_add(gap.saturating_mul(count.saturating_sub(1)))
    }

    /// Position visible children inside the content box, in order.
    pub(super) fn place_children(&mut self, c: &ContainerOp) {
        let row = c.direction.is_row();
        let (origin_x, origin_y) = c.content_origin();
        let mut cursor = 0u16;
        let mut first = true;

        for child in c.child_indices() {
            if !self.geometry[child].visible {
                let g = &mut self.geometry[child];
                g.local_x = origin_x;
                g.local_y = origin_y;
                continue;
            }
            if !first {
                cursor = cursor.saturating_add(c.gap);
            }
            first = false;

            let margin = self.hints(child).margin;
            let g = &mut self.geometry[child];
            if row {
                g.local_x = origin_x.saturating_add(cursor).saturating_add(margin.left);
                g.local_y = origin_y.saturating_add(margin.top);
                cursor = cursor
                    .saturating_add(margin.left)
                    .saturating_add(g.width)
                    .saturating_add(margin.right);
            } else {
                g.local_x = origin_x.saturating_add(margin.left);
                g.local_y = origin_y.saturating_add(cursor).saturating_add(margin.top);
                cursor = cursor
                    .saturating_add(margin.top)
                    .saturating_add(g.height)
                    .saturating_add(margin.bottom);
            }
        }
    }

    /// Window state of a list or table.
    pub(crate) fn window(&self, handle: Option<&WindowHandle>) -> Window {
        handle.map_or(
            Window::new(usize::from(self.config.default_window)),
            WindowHandle::get,
        )
    }
}
