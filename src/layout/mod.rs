//! Layout Module
//!
//! Three ordered passes over one block of a Template, each walking the
//! block's depth levels:
//!
//! 1. **Width** (top-down) - every op receives its width from its parent.
//! 2. **Height** (bottom-up) - leaves measure themselves, containers
//!    aggregate their visible children, children are positioned.
//! 3. **Flex** (top-down) - leftover height goes to flex children, row
//!    children stretch, children are re-positioned.
//!
//! Nested blocks are laid out on demand: a conditional sizes its active
//! branch as soon as it receives a width, and an iteration lays out its body
//! once per element with that element in scope.
//!
//! Conditionals and switches are transparent. They adopt the size hints of
//! their active branch root, the root sits at `(0, 0)` inside them, and
//! without an active branch they are invisible, zero-sized and excluded
//! from gap counting.

mod distribute;
mod flex;
mod height;
mod text_measure;
mod width;

pub use distribute::{distribute, split_columns};
pub use text_measure::{char_width, skip_columns, string_width, truncate};

use crate::binding::Scope;
use crate::config::EngineConfig;
use crate::node::Hints;
use crate::template::{Block, BlockId, Geometry, Op, OpKind};

/// How a block root is sized along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extent {
    /// Exactly this many cells; the root's own hints and margin are ignored
    /// (branch roots, whose owner already applied them).
    Exact(u16),
    /// Resolve the root's hint against this many cells; `Auto` fills them.
    Within(u16),
    /// Resolve the root's hint against this many cells; `Auto` shrinks to
    /// content, capped at the available cells.
    Fit(u16),
}

/// Mutable view of a Template for one frame.
///
/// The op arena and block table are shared; geometry and the overlay queue
/// are written.
pub(crate) struct Frame<'t> {
    pub ops: &'t [Op],
    pub blocks: &'t [Block],
    pub geometry: &'t mut [Geometry],
    pub config: &'t EngineConfig,
    pub overlays: &'t mut Vec<u32>,
}

impl<'t> Frame<'t> {
    // -------------------------------------------------------------------------
    // Block entry points
    // -------------------------------------------------------------------------

    /// Run all three passes over `block`.
    pub fn layout_block(
        &mut self,
        block: BlockId,
        width: Extent,
        height: Extent,
        scope: &Scope<'_>,
    ) {
        self.size_block(block, width, scope);
        self.flex_block(block, height, scope);
    }

    /// Width and height passes. Resets the block's geometry first.
    pub fn size_block(&mut self, block: BlockId, width: Extent, scope: &Scope<'_>) {
        let blocks = self.blocks;
        let entry = &blocks[block.index()];
        let range = entry.root()..entry.ops.end as usize;
        self.geometry[range].fill(Geometry::HIDDEN);

        let root = entry.root();
        if !self.resolve(root, scope) {
            return;
        }

        let margin = self.ops[root].hints.margin;
        let (w, x, y) = match width {
            Extent::Exact(w) => (w, 0, 0),
            Extent::Within(available) => {
                let available = available.saturating_sub(margin.horizontal());
                let w = self.ops[root]
                    .hints
                    .width
                    .resolve(available)
                    .map_or(available, |w| w.min(available));
                (w, margin.left, margin.top)
            }
            Extent::Fit(available) => {
                let available = available.saturating_sub(margin.horizontal());
                let w = match self.ops[root].hints.width.resolve(available) {
                    Some(w) => w.min(available),
                    None => self.intrinsic_width(root, scope).min(available),
                };
                (w, margin.left, margin.top)
            }
        };

        let g = &mut self.geometry[root];
        g.width = w;
        g.local_x = x;
        g.local_y = y;

        {
            let _span = tracing::trace_span!("width", block = block.index()).entered();
            self.width_pass(block, scope);
        }
        let _span = tracing::trace_span!("height", block = block.index()).entered();
        self.height_pass(block, scope);
    }

    /// Flex pass. The block must have been sized this frame.
    pub fn flex_block(&mut self, block: BlockId, height: Extent, scope: &Scope<'_>) {
        let root = self.blocks[block.index()].root();
        if !self.geometry[root].visible {
            return;
        }

        let hint = self.ops[root].hints.height;
        let margin = self.ops[root].hints.margin.vertical();
        let content = self.geometry[root].height;
        self.geometry[root].height = match height {
            Extent::Exact(h) => h,
            Extent::Within(available) => {
                let available = available.saturating_sub(margin);
                hint.resolve(available).map_or(available, |h| h.min(available))
            }
            Extent::Fit(available) => {
                let available = available.saturating_sub(margin);
                hint.resolve(available)
                    .map_or(content.min(available), |h| h.min(available))
            }
        };

        let _span = tracing::trace_span!("flex", block = block.index()).entered();
        self.flex_pass(block, scope);
    }

    // -------------------------------------------------------------------------
    // Presence
    // -------------------------------------------------------------------------

    /// Decide whether op `index` takes part in this frame and, for
    /// conditionals and switches, which branch is active.
    pub fn resolve(&mut self, index: usize, scope: &Scope<'_>) -> bool {
        let ops = self.ops;
        let (visible, branch) = match &ops[index].kind {
            OpKind::Conditional {
                when,
                then,
                otherwise,
            } => {
                let branch = if when.read(scope) { Some(*then) } else { *otherwise };
                (self.branch_visible(branch, scope), branch)
            }
            OpKind::Switch { on, cases, default } => {
                let key = on.read(scope);
                let branch = cases
                    .iter()
                    .find(|(case, _)| *case == key)
                    .map(|(_, block)| *block)
                    .or(*default);
                (self.branch_visible(branch, scope), branch)
            }
            OpKind::Iteration { source, .. } => (source.len(scope) > 0, None),
            OpKind::Overlay { .. } | OpKind::Empty => (false, None),
            _ => (true, None),
        };

        let g = &mut self.geometry[index];
        g.visible = visible;
        g.branch = branch;
        visible
    }

    fn branch_visible(&mut self, branch: Option<BlockId>, scope: &Scope<'_>) -> bool {
        match branch {
            Some(block) => {
                let root = self.blocks[block.index()].root();
                self.resolve(root, scope)
            }
            None => false,
        }
    }

    /// The op whose hints apply to `index`: itself, or for a conditional or
    /// switch the root of its active branch (followed through nesting).
    pub fn effective(&self, mut index: usize) -> usize {
        while self.ops[index].kind.is_branching() {
            match self.geometry[index].branch {
                Some(block) => index = self.blocks[block.index()].root(),
                None => break,
            }
        }
        index
    }

    #[inline]
    pub fn hints(&self, index: usize) -> &'t Hints {
        let ops = self.ops;
        &ops[self.effective(index)].hints
    }

    /// Root op of `block`.
    #[inline]
    pub fn root_of(&self, block: BlockId) -> usize {
        self.blocks[block.index()].root()
    }
}
