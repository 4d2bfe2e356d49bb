//! Compiler - flattens a node tree into a Template.
//!
//! # Emission order
//!
//! Each block is emitted breadth-first: the root, then all of its children,
//! then all grandchildren, and so on. A container's children therefore form
//! one contiguous index range, and each depth level of a block is a
//! contiguous range too, which is what the layout passes walk.
//!
//! Nested bodies (branches, switch cases, iteration bodies, overlay bodies)
//! are not emitted inline. The op that owns them reserves a block id and the
//! body is queued; queued bodies are compiled in FIFO order once the current
//! block is complete. Owners are always emitted before their bodies.
//!
//! # Iteration bodies
//!
//! An `each` render function is called exactly once, here, with a
//! placeholder item at the next iteration level. Every binding it produces is
//! checked against the element types of the enclosing iterations.

use std::any::TypeId;
use std::collections::VecDeque;
use std::ops::Range;

use crate::binding::{ElementSource, Requirement};
use crate::config::EngineConfig;
use crate::error::{CompileError, CompileResult};
use crate::node::{Hints, Node, NodeKind, RenderFn};
use crate::template::{Block, BlockId, ContainerOp, Op, OpKind, Template};
use crate::types::Dimension;
use crate::window::WindowHandle;

/// Element types of the enclosing iterations, outermost first.
type Elements = Vec<(TypeId, &'static str)>;

/// Compiles node trees with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: EngineConfig,
}

impl Compiler {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Compile `root` into a Template. The tree is consumed.
    pub fn compile(self, root: Node) -> CompileResult<Template> {
        let mut emitter = Emitter {
            ops: Vec::new(),
            blocks: Vec::new(),
            pending: VecDeque::new(),
            config: &self.config,
        };

        emitter.reserve(None, Vec::new(), Body::Node(root));
        while let Some((block, body)) = emitter.pending.pop_front() {
            emitter.compile_block(block, body)?;
        }

        let Emitter { ops, blocks, .. } = emitter;
        tracing::debug!(ops = ops.len(), blocks = blocks.len(), "compiled template");
        Ok(Template::from_parts(ops, blocks, self.config))
    }
}

// =============================================================================
// Emitter
// =============================================================================

/// A queued block body.
enum Body {
    Node(Node),
    /// An iteration body, produced by calling the render function with a
    /// placeholder at the block's iteration level.
    Render(RenderFn),
}

struct Emitter<'c> {
    ops: Vec<Op>,
    blocks: Vec<Block>,
    pending: VecDeque<(BlockId, Body)>,
    config: &'c EngineConfig,
}

impl Emitter<'_> {
    fn next_index(&self) -> u32 {
        self.ops.len() as u32
    }

    /// Reserve a block id now; the body is compiled later.
    fn reserve(&mut self, owner: Option<u32>, elements: Elements, body: Body) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block {
            owner,
            ops: 0..0,
            levels: Vec::new(),
            elements,
        });
        self.pending.push_back((id, body));
        id
    }

    fn compile_block(&mut self, block: BlockId, body: Body) -> CompileResult<()> {
        let root = match body {
            Body::Node(node) => node,
            Body::Render(render) => render(self.blocks[block.index()].elements.len()),
        };

        let start = self.next_index();
        let mut queue: VecDeque<(u32, Vec<Node>)> = VecDeque::new();

        if let Some(children) = self.emit(root, None, 0, block)? {
            queue.push_back((start, children));
        }

        while let Some((parent, children)) = queue.pop_front() {
            let depth = self.ops[parent as usize].depth + 1;
            let first = self.next_index();
            for child in children {
                let index = self.next_index();
                if let Some(grandchildren) = self.emit(child, Some(parent), depth, block)? {
                    queue.push_back((index, grandchildren));
                }
            }
            let range = first..self.next_index();
            if let OpKind::Container(c) = &mut self.ops[parent as usize].kind {
                c.children = range;
            }
        }

        let end = self.next_index();
        let levels = group_levels(&self.ops, start..end);
        let entry = &mut self.blocks[block.index()];
        entry.ops = start..end;
        entry.levels = levels;
        Ok(())
    }

    /// Emit one op. Containers hand back their children for the BFS queue.
    fn emit(
        &mut self,
        node: Node,
        parent: Option<u32>,
        depth: u16,
        block: BlockId,
    ) -> CompileResult<Option<Vec<Node>>> {
        validate_hints(&node.hints)?;

        let index = self.next_index();
        let elements = self.blocks[block.index()].elements.clone();
        let mut children = None;

        let kind = match node.kind {
            NodeKind::Container(c) => {
                children = Some(c.children);
                OpKind::Container(ContainerOp {
                    direction: c.direction,
                    gap: c.gap,
                    padding: c.padding,
                    border: c.border,
                    border_style: c.border_style,
                    cascade: c.cascade,
                    fill: c.fill,
                    children: 0..0,
                })
            }
            NodeKind::Text(t) => {
                check(t.content.requirement(), &elements)?;
                check(t.style.requirement(), &elements)?;
                OpKind::Text(t)
            }
            NodeKind::Gauge(g) => {
                check(g.value.requirement(), &elements)?;
                check(g.total.requirement(), &elements)?;
                check(g.style.requirement(), &elements)?;
                OpKind::Gauge(g)
            }
            NodeKind::Rule(r) => {
                check(r.style.requirement(), &elements)?;
                OpKind::Rule(r)
            }
            NodeKind::List(mut l) => {
                check_source(&*l.source, &elements)?;
                check(l.style.requirement(), &elements)?;
                check(l.selected.as_ref().and_then(|s| s.requirement()), &elements)?;
                l.window.get_or_insert_with(|| self.default_window());
                OpKind::List(l)
            }
            NodeKind::Table(mut t) => {
                if t.columns.is_empty() {
                    return Err(CompileError::EmptyTable);
                }
                for column in &t.columns {
                    validate_dimension(column.width)?;
                    validate_flex(column.flex)?;
                }
                check_source(&*t.source, &elements)?;
                check(t.style.requirement(), &elements)?;
                check(t.selected.as_ref().and_then(|s| s.requirement()), &elements)?;
                t.window.get_or_insert_with(|| self.default_window());
                OpKind::Table(t)
            }
            NodeKind::Custom(c) => OpKind::Custom(c),
            NodeKind::Show(s) => {
                check(s.when.requirement(), &elements)?;
                let then = self.reserve(Some(index), elements.clone(), Body::Node(*s.then));
                let otherwise = s
                    .otherwise
                    .map(|n| self.reserve(Some(index), elements.clone(), Body::Node(*n)));
                OpKind::Conditional {
                    when: s.when,
                    then,
                    otherwise,
                }
            }
            NodeKind::Switch(s) => {
                check(s.on.requirement(), &elements)?;
                let cases = s
                    .cases
                    .into_iter()
                    .map(|(key, n)| {
                        let block = self.reserve(Some(index), elements.clone(), Body::Node(n));
                        (key, block)
                    })
                    .collect();
                let default = s
                    .default
                    .map(|n| self.reserve(Some(index), elements.clone(), Body::Node(*n)));
                OpKind::Switch {
                    on: s.on,
                    cases,
                    default,
                }
            }
            NodeKind::Each(e) => {
                check_source(&*e.source, &elements)?;
                let mut inner = elements.clone();
                inner.push(e.source.element());
                let body = self.reserve(Some(index), inner, Body::Render(e.render));
                OpKind::Iteration {
                    source: e.source,
                    body,
                    gap: e.gap,
                }
            }
            NodeKind::Overlay(o) => {
                if !elements.is_empty() {
                    return Err(CompileError::OverlayInIteration {
                        level: elements.len(),
                    });
                }
                check(o.visible.requirement(), &elements)?;
                let body = self.reserve(Some(index), Vec::new(), Body::Node(*o.body));
                OpKind::Overlay {
                    body,
                    visible: o.visible,
                    anchor: o.anchor,
                }
            }
            NodeKind::Empty => OpKind::Empty,
        };

        self.ops.push(Op {
            parent,
            depth,
            hints: node.hints,
            kind,
        });
        Ok(children)
    }

    fn default_window(&self) -> WindowHandle {
        WindowHandle::new(usize::from(self.config.default_window))
    }
}

/// Split a BFS-ordered block into per-depth ranges.
fn group_levels(ops: &[Op], range: Range<u32>) -> Vec<Range<u32>> {
    let mut levels: Vec<Range<u32>> = Vec::new();
    for index in range {
        let depth = ops[index as usize].depth as usize;
        if depth == levels.len() {
            levels.push(index..index + 1);
        } else if let Some(level) = levels.get_mut(depth) {
            level.end = index + 1;
        }
    }
    levels
}

// =============================================================================
// Validation
// =============================================================================

fn validate_flex(weight: f32) -> CompileResult<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(CompileError::InvalidFlex { weight })
    }
}

fn validate_dimension(dimension: Dimension) -> CompileResult<()> {
    match dimension {
        Dimension::Percent(percent)
            if !(percent.is_finite() && (0.0..=100.0).contains(&percent)) =>
        {
            Err(CompileError::InvalidPercent { percent })
        }
        _ => Ok(()),
    }
}

fn validate_hints(hints: &Hints) -> CompileResult<()> {
    validate_flex(hints.flex)?;
    validate_dimension(hints.width)?;
    validate_dimension(hints.height)
}

/// A field binding must name an enclosing iteration of its element type.
fn check(requirement: Option<Requirement>, elements: &Elements) -> CompileResult<()> {
    let Some(req) = requirement else {
        return Ok(());
    };
    if req.level == 0 || req.level > elements.len() {
        return Err(CompileError::UnboundField {
            element: req.element_name,
            level: req.level,
            depth: elements.len(),
        });
    }
    let (found, found_name) = elements[req.level - 1];
    if found != req.element {
        return Err(CompileError::ElementTypeMismatch {
            expected: req.element_name,
            found: found_name,
            level: req.level,
        });
    }
    Ok(())
}

fn check_source(source: &dyn ElementSource, elements: &Elements) -> CompileResult<()> {
    check(source.requirement(), elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Item, Sequence};
    use crate::node::{Column, col, each, empty, list, overlay, row, show, switch, table, text};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Task {
        name: String,
        tags: Vec<String>,
    }

    fn tasks() -> Sequence<Task> {
        Sequence::new(Rc::new(RefCell::new(Vec::new())))
    }

    fn setup(root: Node) -> Template {
        match Template::compile(root) {
            Ok(template) => template,
            Err(err) => panic!("compile failed: {err}"),
        }
    }

    #[test]
    fn test_breadth_first_children_are_contiguous() {
        let template = setup(col([
            row([text("a"), text("b")]),
            text("c"),
            row([text("d")]),
        ]));

        let kinds: Vec<_> = template.ops().iter().map(|op| op.kind.name()).collect();
        assert_eq!(kinds, ["container", "container", "text", "container", "text", "text", "text"]);

        let root = template.ops()[0].kind.as_container().map(|c| c.children.clone());
        assert_eq!(root, Some(1..4));
        let first_row = template.ops()[1].kind.as_container().map(|c| c.children.clone());
        assert_eq!(first_row, Some(4..6));
        let last_row = template.ops()[3].kind.as_container().map(|c| c.children.clone());
        assert_eq!(last_row, Some(6..7));

        for (index, op) in template.ops().iter().enumerate() {
            if let Some(parent) = op.parent {
                assert!((parent as usize) < index);
                let children = template.ops()[parent as usize]
                    .kind
                    .as_container()
                    .map(|c| c.children.clone());
                assert!(children.is_some_and(|r| r.contains(&(index as u32))));
            }
        }

        let block = &template.blocks()[0];
        assert_eq!(block.levels, vec![0..1, 1..4, 4..7]);
    }

    #[test]
    fn test_nested_bodies_compile_into_later_blocks() {
        let template = setup(col([
            show(true, text("then"), Some(text("else"))),
            text("after"),
        ]));

        assert_eq!(template.blocks().len(), 3);
        let main = &template.blocks()[0];
        assert_eq!(main.ops, 0..3);
        let OpKind::Conditional { then, otherwise, .. } = &template.ops()[1].kind else {
            panic!("expected conditional");
        };
        let then_block = &template.blocks()[then.index()];
        assert_eq!(then_block.owner, Some(1));
        assert_eq!(then_block.ops, 3..4);
        assert_eq!(otherwise.map(|b| template.blocks()[b.index()].ops.clone()), Some(4..5));
        assert_eq!(template.block_of(3), Some(*then));
        assert_eq!(template.block_of(0), Some(BlockId::MAIN));
    }

    #[test]
    fn test_render_fn_called_once() {
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let template = setup(each(tasks(), move |item: Item<Task>| {
            *counter.borrow_mut() += 1;
            text(item.field(|t| t.name.clone()))
        }));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(template.blocks()[1].iteration_depth(), 1);
    }

    #[test]
    fn test_nested_iteration_levels() {
        let template = setup(each(tasks(), |task: Item<Task>| {
            col([
                text(task.field(|t| t.name.clone())),
                each(task.items(|t| t.tags.as_slice()), move |tag: Item<String>| {
                    row([
                        text(task.field(|t| t.name.clone())),
                        text(tag.field(|s| s.clone())),
                    ])
                }),
            ])
        }));
        assert_eq!(template.blocks().len(), 3);
        assert_eq!(template.blocks()[2].iteration_depth(), 2);
    }

    #[test]
    fn test_field_outside_iteration_is_unbound() {
        let item: Item<Task> = Item::new(1);
        let err = Template::compile(text(item.field(|t| t.name.clone()))).err();
        assert!(matches!(
            err,
            Some(CompileError::UnboundField { level: 1, depth: 0, .. })
        ));
    }

    #[test]
    fn test_field_of_wrong_element_type() {
        let stray: Item<String> = Item::new(1);
        let err = Template::compile(each(tasks(), move |_task: Item<Task>| {
            text(stray.field(|s| s.clone()))
        }))
        .err();
        assert!(matches!(
            err,
            Some(CompileError::ElementTypeMismatch { level: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_hints() {
        let err = Template::compile(text("x").flex(-1.0)).err();
        assert!(matches!(err, Some(CompileError::InvalidFlex { .. })));

        let err = Template::compile(text("x").width(crate::types::Dimension::Percent(150.0))).err();
        assert!(matches!(err, Some(CompileError::InvalidPercent { .. })));

        let err = Template::compile(text("x").flex(f32::NAN)).err();
        assert!(matches!(err, Some(CompileError::InvalidFlex { .. })));
    }

    #[test]
    fn test_overlay_inside_iteration_rejected() {
        let err = Template::compile(each(tasks(), |_task: Item<Task>| {
            overlay(text("popup"), true)
        }))
        .err();
        assert_eq!(err, Some(CompileError::OverlayInIteration { level: 1 }));
    }

    #[test]
    fn test_empty_table_rejected() {
        let columns: Vec<Column<Task>> = Vec::new();
        let err = Template::compile(table(tasks(), columns)).err();
        assert_eq!(err, Some(CompileError::EmptyTable));
    }

    #[test]
    fn test_list_gets_default_window() {
        let config = EngineConfig::default().with_default_window(4);
        let template = match Template::compile_with(list(tasks(), |t| t.name.clone()), config) {
            Ok(t) => t,
            Err(err) => panic!("{err}"),
        };
        let OpKind::List(leaf) = &template.ops()[0].kind else {
            panic!("expected list");
        };
        assert_eq!(leaf.window.as_ref().map(|w| w.get().max_visible()), Some(4));
    }

    #[test]
    fn test_switch_cases_get_blocks() {
        let template = setup(col([
            switch("b").case("a", text("A")).case("b", text("B")).default_case(empty()),
        ]));
        let OpKind::Switch { cases, default, .. } = &template.ops()[1].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(default.is_some());
        assert_eq!(template.blocks().len(), 4);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let build = || {
            col([
                text("title").id("title"),
                row([text("a").flex(1.0), show(true, text("b"), None)]),
                each(tasks(), |t: Item<Task>| text(t.field(|t| t.name.clone()))),
            ])
        };
        let a = setup(build());
        let b = setup(build());
        let shape = |t: &Template| {
            t.ops()
                .iter()
                .map(|op| (op.kind.name(), op.parent, op.depth))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&a), shape(&b));
        assert_eq!(a.find("title"), Some(1));
    }
}
