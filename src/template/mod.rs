//! Template - the compiled, re-executable form of a node tree.
//!
//! A Template owns one flat arena of [`Op`]s, a parallel array of
//! [`Geometry`] and a list of [`Block`]s. Block 0 is the main tree. Every
//! conditional branch, switch case, iteration body and overlay body is its
//! own block: a contiguous index range compiled after its owner, so ops
//! never point outside the arena and the whole structure is plain indices.
//!
//! ```text
//! ops:     [ main block ........ | then-branch | each-body ...... ]
//! blocks:  [ 0: 0..7, owner None | 1: 7..8     | 2: 8..12, owner 5 ]
//! ```

mod geometry;
mod op;

pub use geometry::Geometry;
pub use op::{ContainerOp, Op, OpKind};

use std::any::TypeId;
use std::fmt;
use std::ops::Range;

use crate::compiler::Compiler;
use crate::config::EngineConfig;
use crate::error::CompileResult;
use crate::node::Node;
use crate::types::ClipRect;

// =============================================================================
// Blocks
// =============================================================================

/// Index of a block in [`Template::blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The main tree.
    pub const MAIN: BlockId = BlockId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous run of ops with a single root.
#[derive(Debug, Clone)]
pub struct Block {
    /// Op that owns this block (conditional, switch, iteration or overlay).
    pub owner: Option<u32>,
    /// Op index range; the first op is the root.
    pub ops: Range<u32>,
    /// Op ranges grouped by depth within the block.
    pub levels: Vec<Range<u32>>,
    /// Element types of the enclosing iterations, outermost first.
    pub(crate) elements: Vec<(TypeId, &'static str)>,
}

impl Block {
    #[inline]
    pub fn root(&self) -> usize {
        self.ops.start as usize
    }

    /// Number of iterations enclosing this block.
    #[inline]
    pub fn iteration_depth(&self) -> usize {
        self.elements.len()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// =============================================================================
// Template
// =============================================================================

/// A compiled UI, executed once per frame.
pub struct Template {
    pub(crate) ops: Vec<Op>,
    pub(crate) geometry: Vec<Geometry>,
    pub(crate) blocks: Vec<Block>,
    /// Overlay ops queued during the current frame's paint.
    pub(crate) overlays: Vec<u32>,
    pub(crate) config: EngineConfig,
}

impl Template {
    /// Compile `root` with the default configuration.
    pub fn compile(root: Node) -> CompileResult<Self> {
        Self::compile_with(root, EngineConfig::default())
    }

    pub fn compile_with(root: Node, config: EngineConfig) -> CompileResult<Self> {
        Compiler::new(config).compile(root)
    }

    pub(crate) fn from_parts(ops: Vec<Op>, blocks: Vec<Block>, config: EngineConfig) -> Self {
        let geometry = vec![Geometry::HIDDEN; ops.len()];
        Self {
            ops,
            geometry,
            blocks,
            overlays: Vec::new(),
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn op(&self, index: usize) -> Option<&Op> {
        self.ops.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Block containing op `index`.
    pub fn block_of(&self, index: usize) -> Option<BlockId> {
        let index = u32::try_from(index).ok()?;
        // Blocks are compiled in order, so their ranges ascend.
        let after = self.blocks.partition_point(|b| b.ops.start <= index);
        let candidate = after.checked_sub(1)?;
        self.blocks[candidate]
            .ops
            .contains(&index)
            .then(|| BlockId(candidate as u32))
    }

    /// First op whose id hint equals `id`.
    pub fn find(&self, id: &str) -> Option<usize> {
        self.ops
            .iter()
            .position(|op| op.hints.id.as_deref() == Some(id))
    }

    // -------------------------------------------------------------------------
    // Layout results
    // -------------------------------------------------------------------------

    /// Geometry of op `index` from the last executed frame.
    pub fn geometry(&self, index: usize) -> Option<Geometry> {
        self.geometry.get(index).copied()
    }

    /// Absolute box of op `index` from the last executed frame.
    ///
    /// Ops inside an iteration body report the placement of the last element
    /// painted. Overlay bodies are placed where the overlay was last drawn.
    pub fn bounds(&self, index: usize) -> Option<ClipRect> {
        let target = self.geometry.get(index)?;
        let (mut x, mut y) = (0u16, 0u16);
        let mut i = index;
        loop {
            let g = &self.geometry[i];
            x = x.saturating_add(g.local_x);
            y = y.saturating_add(g.local_y);
            if matches!(self.ops[i].kind, OpKind::Overlay { .. }) {
                break;
            }
            i = match self.ops[i].parent {
                Some(parent) => parent as usize,
                None => match self.block_of(i).and_then(|b| self.blocks[b.index()].owner) {
                    Some(owner) => owner as usize,
                    None => break,
                },
            };
        }
        Some(ClipRect::new(x, y, target.width, target.height))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("ops", &self.ops.len())
            .field("blocks", &self.blocks.len())
            .field("config", &self.config)
            .finish()
    }
}
