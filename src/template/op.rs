//! Op - one compiled instruction.
//!
//! Ops live in a single arena per Template. Within a block they are emitted
//! breadth-first, so a container's children are one contiguous index range
//! and every parent sits at a lower index than its descendants.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::binding::{Binding, ElementSource};
use crate::node::{Anchor, CustomLeaf, GaugeLeaf, Hints, ListLeaf, RuleLeaf, TableLeaf, TextLeaf};
use crate::types::{BorderStyle, Direction, Edges, Rgba, Style};

use super::BlockId;

/// A compiled node.
pub struct Op {
    /// Parent within the same block; `None` for a block root.
    pub parent: Option<u32>,
    /// Depth within the block (root = 0).
    pub depth: u16,
    pub hints: Hints,
    pub kind: OpKind,
}

/// A container after its children are emitted.
#[derive(Debug, Clone)]
pub struct ContainerOp {
    pub direction: Direction,
    pub gap: u16,
    pub padding: Edges,
    pub border: BorderStyle,
    pub border_style: Style,
    pub cascade: Option<Style>,
    pub fill: Option<Rgba>,
    pub children: Range<u32>,
}

impl ContainerOp {
    /// Cells taken by padding plus border on the horizontal axis.
    #[inline]
    pub fn inset_x(&self) -> u16 {
        self.padding
            .horizontal()
            .saturating_add(self.border.thickness() * 2)
    }

    /// Cells taken by padding plus border on the vertical axis.
    #[inline]
    pub fn inset_y(&self) -> u16 {
        self.padding
            .vertical()
            .saturating_add(self.border.thickness() * 2)
    }

    /// Offset of the content box from the border-box origin.
    #[inline]
    pub fn content_origin(&self) -> (u16, u16) {
        let border = self.border.thickness();
        (
            self.padding.left.saturating_add(border),
            self.padding.top.saturating_add(border),
        )
    }

    pub fn child_indices(&self) -> Range<usize> {
        (self.children.start as usize)..(self.children.end as usize)
    }
}

/// Instruction payload.
pub enum OpKind {
    Container(ContainerOp),
    Text(TextLeaf),
    Gauge(GaugeLeaf),
    Rule(RuleLeaf),
    List(ListLeaf),
    Table(TableLeaf),
    Custom(CustomLeaf),
    Conditional {
        when: Binding<bool>,
        then: BlockId,
        otherwise: Option<BlockId>,
    },
    Switch {
        on: Binding<String>,
        cases: Vec<(String, BlockId)>,
        default: Option<BlockId>,
    },
    Iteration {
        source: Rc<dyn ElementSource>,
        body: BlockId,
        gap: u16,
    },
    Overlay {
        body: BlockId,
        visible: Binding<bool>,
        anchor: Anchor,
    },
    Empty,
}

impl OpKind {
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Container(_) => "container",
            OpKind::Text(_) => "text",
            OpKind::Gauge(_) => "gauge",
            OpKind::Rule(_) => "rule",
            OpKind::List(_) => "list",
            OpKind::Table(_) => "table",
            OpKind::Custom(_) => "custom",
            OpKind::Conditional { .. } => "conditional",
            OpKind::Switch { .. } => "switch",
            OpKind::Iteration { .. } => "iteration",
            OpKind::Overlay { .. } => "overlay",
            OpKind::Empty => "empty",
        }
    }

    /// Conditional and switch ops lay out as their active branch.
    #[inline]
    pub fn is_branching(&self) -> bool {
        matches!(self, OpKind::Conditional { .. } | OpKind::Switch { .. })
    }

    pub fn as_container(&self) -> Option<&ContainerOp> {
        match self {
            OpKind::Container(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Op");
        s.field("kind", &self.kind.name())
            .field("parent", &self.parent)
            .field("depth", &self.depth);
        if let OpKind::Container(c) = &self.kind {
            s.field("children", &c.children);
        }
        if let Some(id) = &self.hints.id {
            s.field("id", id);
        }
        s.finish()
    }
}
