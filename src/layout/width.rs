//! Width pass (top-down) and intrinsic widths.

use crate::binding::{ElementSource, Scope};
use crate::template::{BlockId, ContainerOp, OpKind};
use crate::types::Dimension;

use super::{Extent, Frame, distribute, string_width};

impl Frame<'_> {
    pub(super) fn width_pass(&mut self, block: BlockId, scope: &Scope<'_>) {
        let blocks = self.blocks;
        for level in &blocks[block.index()].levels {
            for index in level.start as usize..level.end as usize {
                if self.geometry[index].visible {
                    self.assign_width(index, scope);
                }
            }
        }
    }

    /// Hand `index`'s width down to its children (or its active branch).
    fn assign_width(&mut self, index: usize, scope: &Scope<'_>) {
        let ops = self.ops;
        match &ops[index].kind {
            OpKind::Container(c) => {
                for child in c.child_indices() {
                    self.resolve(child, scope);
                }
                if c.direction.is_row() {
                    self.row_widths(index, c, scope);
                } else {
                    self.column_widths(index, c);
                }
            }
            OpKind::Conditional { .. } | OpKind::Switch { .. } => {
                if let Some(block) = self.geometry[index].branch {
                    let width = self.geometry[index].width;
                    self.size_block(block, Extent::Exact(width), scope);
                }
            }
            _ => {}
        }
    }

    /// Vertical container: every child spans the content width.
    fn column_widths(&mut self, index: usize, c: &ContainerOp) {
        let inner = self.geometry[index].width.saturating_sub(c.inset_x());
        for child in c.child_indices() {
            if !self.geometry[child].visible {
                continue;
            }
            let hints = self.hints(child);
            let available = inner.saturating_sub(hints.margin.horizontal());
            self.geometry[child].width = hints
                .width
                .resolve(inner)
                .map_or(available, |w| w.min(available));
        }
    }

    /// Horizontal container.
    ///
    /// Pass A fixes every child with an explicit, percent or content-derived
    /// width. Pass B splits the remainder across explicit flex children by
    /// weight, or evenly across width-less children when no child declares
    /// flex. With explicit flex present, width-less children are fixed at
    /// their intrinsic width in pass A.
    fn row_widths(&mut self, index: usize, c: &ContainerOp, scope: &Scope<'_>) {
        let inner = self.geometry[index].width.saturating_sub(c.inset_x());

        let mut count = 0u16;
        let mut has_flex = false;
        for child in c.child_indices() {
            if self.geometry[child].visible {
                count += 1;
                has_flex |= self.hints(child).flex > 0.0;
            }
        }

        let mut used = c.gap.saturating_mul(count.saturating_sub(1));
        let mut recipients = Vec::new();
        let mut weights = Vec::new();

        for child in c.child_indices() {
            if !self.geometry[child].visible {
                continue;
            }
            let hints = self.hints(child);
            used = used.saturating_add(hints.margin.horizontal());

            let fixed = match hints.width {
                Dimension::Auto if hints.flex > 0.0 => None,
                Dimension::Auto => match self.content_width(child, scope) {
                    Some(w) => Some(w),
                    None if has_flex => Some(self.intrinsic_width(child, scope)),
                    None => None,
                },
                explicit => explicit.resolve(inner),
            };

            match fixed {
                Some(w) => {
                    let w = w.min(inner.saturating_sub(used));
                    self.geometry[child].width = w;
                    used += w;
                }
                None => {
                    recipients.push(child);
                    weights.push(if hints.flex > 0.0 { hints.flex } else { 1.0 });
                }
            }
        }

        let mut shares = vec![0u16; recipients.len()];
        distribute(inner.saturating_sub(used), &weights, &mut shares);
        for (child, share) in recipients.into_iter().zip(shares) {
            self.geometry[child].width = share;
        }
    }

    /// Width a leaf derives from its content, for leaves that have one.
    fn content_width(&mut self, index: usize, scope: &Scope<'_>) -> Option<u16> {
        let ops = self.ops;
        match &ops[self.effective(index)].kind {
            OpKind::Text(t) => Some(string_width(&t.content.read(scope))),
            OpKind::Custom(c) if c.intrinsic_width > 0 => Some(c.intrinsic_width),
            _ => None,
        }
    }

    /// Natural width of `index` and its subtree, ignoring the available space.
    pub(super) fn intrinsic_width(&mut self, index: usize, scope: &Scope<'_>) -> u16 {
        let ops = self.ops;
        let op = &ops[index];
        if let Dimension::Cells(n) = op.hints.width {
            return n;
        }

        match &op.kind {
            OpKind::Container(c) => {
                let row = c.direction.is_row();
                let mut total = 0u16;
                let mut count = 0u16;
                for child in c.child_indices() {
                    if !self.resolve(child, scope) {
                        continue;
                    }
                    let margin = self.hints(child).margin.horizontal();
                    let w = self.intrinsic_width(child, scope).saturating_add(margin);
                    total = if row { total.saturating_add(w) } else { total.max(w) };
                    count += 1;
                }
                if row {
                    total = total.saturating_add(c.gap.saturating_mul(count.saturating_sub(1)));
                }
                total.saturating_add(c.inset_x())
            }
            OpKind::Text(t) => string_width(&t.content.read(scope)),
            OpKind::List(l) => {
                let window = self.window(l.window.as_ref());
                let total = l.source.len(scope);
                let mut widest = l.header.as_deref().map_or(0, string_width);
                l.source.visit(scope, window.range(total), &mut |_, element| {
                    let label = (l.label)(element).unwrap_or_default();
                    widest = widest.max(string_width(&label));
                });
                widest
            }
            OpKind::Table(t) => {
                let gaps = self
                    .config
                    .column_gap
                    .saturating_mul(t.columns.len().saturating_sub(1) as u16);
                t.columns
                    .iter()
                    .map(|column| match column.width {
                        Dimension::Cells(n) => n,
                        _ => string_width(&column.title),
                    })
                    .fold(gaps, u16::saturating_add)
            }
            OpKind::Custom(c) => c.intrinsic_width,
            OpKind::Conditional { .. } | OpKind::Switch { .. } => {
                if !self.resolve(index, scope) {
                    return 0;
                }
                match self.geometry[index].branch {
                    Some(block) => {
                        let root = self.root_of(block);
                        self.intrinsic_width(root, scope)
                    }
                    None => 0,
                }
            }
            OpKind::Iteration { source, body, .. } => {
                self.iteration_intrinsic_width(&**source, *body, scope)
            }
            OpKind::Gauge(_) | OpKind::Rule(_) | OpKind::Overlay { .. } | OpKind::Empty => 0,
        }
    }

    fn iteration_intrinsic_width(
        &mut self,
        source: &dyn ElementSource,
        body: BlockId,
        scope: &Scope<'_>,
    ) -> u16 {
        let root = self.root_of(body);
        let margin = self.ops[root].hints.margin.horizontal();
        let mut widest = 0u16;
        source.visit(scope, 0..usize::MAX, &mut |i, element| {
            let inner = scope.enter(element, i);
            if self.resolve(root, &inner) {
                let w = self.intrinsic_width(root, &inner).saturating_add(margin);
                widest = widest.max(w);
            }
        });
        widest
    }
}
