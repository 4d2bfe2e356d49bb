//! Flex pass (top-down): leftover height, row stretch, re-positioning.

use crate::binding::Scope;
use crate::template::{BlockId, ContainerOp, OpKind};
use crate::types::Dimension;

use super::{Extent, Frame, distribute};

impl Frame<'_> {
    pub(super) fn flex_pass(&mut self, block: BlockId, scope: &Scope<'_>) {
        let blocks = self.blocks;
        for level in &blocks[block.index()].levels {
            for index in level.start as usize..level.end as usize {
                if self.geometry[index].visible {
                    self.grow(index, scope);
                }
            }
        }
    }

    fn grow(&mut self, index: usize, scope: &Scope<'_>) {
        let ops = self.ops;
        match &ops[index].kind {
            OpKind::Container(c) => {
                if c.direction.is_row() {
                    self.stretch_children(index, c);
                } else {
                    self.grow_children(index, c);
                }
                self.place_children(c);
            }
            OpKind::Conditional { .. } | OpKind::Switch { .. } => {
                if let Some(block) = self.geometry[index].branch {
                    let height = self.geometry[index].height;
                    self.flex_block(block, Extent::Exact(height), scope);
                }
            }
            _ => {}
        }
    }

    /// Vertical container: resolve percent heights, then hand the leftover
    /// rows to flex children by weight.
    fn grow_children(&mut self, index: usize, c: &ContainerOp) {
        let inner = self.geometry[index].height.saturating_sub(c.inset_y());

        let mut count = 0u16;
        for child in c.child_indices() {
            count += u16::from(self.geometry[child].visible);
        }

        let mut used = c.gap.saturating_mul(count.saturating_sub(1));
        let mut recipients = Vec::new();
        let mut weights = Vec::new();

        for child in c.child_indices() {
            if !self.geometry[child].visible {
                continue;
            }
            let hints = self.hints(child);
            used = used.saturating_add(hints.margin.vertical());
            if hints.flex > 0.0 {
                recipients.push(child);
                weights.push(hints.flex);
                continue;
            }
            if let Dimension::Percent(_) = hints.height {
                if let Some(h) = hints.height.resolve(inner) {
                    self.geometry[child].height = h;
                }
            }
            used = used.saturating_add(self.geometry[child].height);
        }

        if recipients.is_empty() {
            return;
        }
        let mut shares = vec![0u16; recipients.len()];
        distribute(inner.saturating_sub(used), &weights, &mut shares);
        for (child, share) in recipients.into_iter().zip(shares) {
            self.geometry[child].height = share;
        }
    }

    /// Horizontal container: `Auto`-height children fill the inner height.
    fn stretch_children(&mut self, index: usize, c: &ContainerOp) {
        let inner = self.geometry[index].height.saturating_sub(c.inset_y());
        for child in c.child_indices() {
            if !self.geometry[child].visible {
                continue;
            }
            let hints = self.hints(child);
            let height = match hints.height {
                Dimension::Auto => Some(inner.saturating_sub(hints.margin.vertical())),
                Dimension::Percent(_) => hints.height.resolve(inner),
                Dimension::Cells(_) => None,
            };
            if let Some(h) = height {
                self.geometry[child].height = h;
            }
        }
    }
}
