//! Node tree - the declarative description a Template is compiled from.
//!
//! A UI is built from plain builder functions and chained setters:
//!
//! ```
//! use spark_template::node::{col, row, text};
//! use spark_template::types::BorderStyle;
//!
//! let ui = col([
//!     text("Header"),
//!     row([text("left").flex(1.0), text("right").flex(2.0)]).flex(1.0),
//!     text("Footer"),
//! ])
//! .border(BorderStyle::Rounded);
//! # let _ = ui;
//! ```
//!
//! The tree is consumed by the compiler exactly once. Nothing here is read
//! while a frame executes.
//!
//! Setters that only make sense for one kind of node (`gap` on a container,
//! `selected` on a list) are ignored on other kinds.

use std::fmt;
use std::rc::Rc;

use crate::binding::{
    Binding, ElementReader, ElementSource, Item, Scope, Sequence, element_reader,
};
use crate::renderer::Canvas;
use crate::types::{BorderStyle, Dimension, Direction, Edges, Rgba, Style, TextAlign};
use crate::window::WindowHandle;

// =============================================================================
// Callback Types
// =============================================================================

/// Height of a custom leaf for a given width. The scope carries the
/// elements of the enclosing iterations.
pub type MeasureFn = Rc<dyn Fn(u16, &Scope<'_>) -> u16>;

/// Paint callback of a custom leaf. The canvas is translated to the leaf's
/// origin and clipped to its box.
pub type PaintFn = Rc<dyn Fn(&mut Canvas<'_>, &Scope<'_>)>;

/// Type-erased per-element render function (argument: iteration level).
pub(crate) type RenderFn = Rc<dyn Fn(usize) -> Node>;

// =============================================================================
// Hints - sizing shared by every node
// =============================================================================

/// Size and spacing hints common to every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    /// Lookup id for [`Template::find`](crate::Template::find).
    pub id: Option<String>,
    pub width: Dimension,
    pub height: Dimension,
    /// Flex-grow weight along the parent's main axis (0 = no grow).
    pub flex: f32,
    pub margin: Edges,
}

// =============================================================================
// Node
// =============================================================================

/// One node of the declarative tree.
pub struct Node {
    pub hints: Hints,
    pub kind: NodeKind,
}

/// Closed set of node kinds.
pub enum NodeKind {
    Container(ContainerNode),
    Text(TextLeaf),
    Gauge(GaugeLeaf),
    Rule(RuleLeaf),
    List(ListLeaf),
    Table(TableLeaf),
    Custom(CustomLeaf),
    Show(ShowNode),
    Switch(SwitchNode),
    Each(EachNode),
    Overlay(OverlayNode),
    /// Takes no space and paints nothing.
    Empty,
}

impl NodeKind {
    /// Short kind name for logs and debug output.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Container(_) => "container",
            NodeKind::Text(_) => "text",
            NodeKind::Gauge(_) => "gauge",
            NodeKind::Rule(_) => "rule",
            NodeKind::List(_) => "list",
            NodeKind::Table(_) => "table",
            NodeKind::Custom(_) => "custom",
            NodeKind::Show(_) => "show",
            NodeKind::Switch(_) => "switch",
            NodeKind::Each(_) => "each",
            NodeKind::Overlay(_) => "overlay",
            NodeKind::Empty => "empty",
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("kind", &self.kind.name()).field("hints", &self.hints);
        if let NodeKind::Container(c) = &self.kind {
            s.field("children", &c.children);
        }
        s.finish()
    }
}

// =============================================================================
// Node Payloads
// =============================================================================

/// A box laying out its children along one axis.
pub struct ContainerNode {
    pub direction: Direction,
    /// Cells between adjacent visible children.
    pub gap: u16,
    pub padding: Edges,
    pub border: BorderStyle,
    pub border_style: Style,
    /// Style inherited by every descendant.
    pub cascade: Option<Style>,
    /// Background painted under the container and inherited by descendants.
    pub fill: Option<Rgba>,
    pub children: Vec<Node>,
}

/// A single line of text.
#[derive(Clone)]
pub struct TextLeaf {
    pub content: Binding<String>,
    pub style: Binding<Style>,
    pub align: TextAlign,
}

/// A horizontal progress bar.
#[derive(Clone)]
pub struct GaugeLeaf {
    pub value: Binding<f64>,
    pub total: Binding<f64>,
    pub style: Binding<Style>,
    /// Style of the unfilled part; inherits `style` when unset.
    pub empty_style: Style,
}

/// A horizontal line across the leaf's width.
#[derive(Clone)]
pub struct RuleLeaf {
    pub style: Binding<Style>,
    /// Overrides the configured rule glyph.
    pub glyph: Option<char>,
}

/// Row highlight styles shared by lists and tables.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowStyles {
    pub selected: Style,
    pub header: Style,
}

/// A windowed list of labels, one row per element.
#[derive(Clone)]
pub struct ListLeaf {
    pub(crate) source: Rc<dyn ElementSource>,
    pub(crate) label: ElementReader<String>,
    pub selected: Option<Binding<usize>>,
    /// Window state; the compiler supplies one when unset.
    pub window: Option<WindowHandle>,
    pub header: Option<String>,
    pub style: Binding<Style>,
    pub styles: RowStyles,
}

/// One table column.
pub struct Column<E> {
    title: String,
    width: Dimension,
    flex: f32,
    read: Rc<dyn Fn(&E) -> String>,
}

impl<E: 'static> Column<E> {
    /// A column titled `title` showing `read(element)` per row.
    pub fn new(title: impl Into<String>, read: impl Fn(&E) -> String + 'static) -> Self {
        Self {
            title: title.into(),
            width: Dimension::Auto,
            flex: 0.0,
            read: Rc::new(read),
        }
    }

    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self
    }

    pub fn flex(mut self, weight: f32) -> Self {
        self.flex = weight;
        self
    }

    fn erase(self) -> TableColumn {
        let read = self.read;
        TableColumn {
            title: self.title,
            width: self.width,
            flex: self.flex,
            read: element_reader(move |e: &E| read(e)),
        }
    }
}

/// A column after the element type is erased.
#[derive(Clone)]
pub struct TableColumn {
    pub title: String,
    pub width: Dimension,
    pub flex: f32,
    pub(crate) read: ElementReader<String>,
}

/// A windowed table, one row per element.
#[derive(Clone)]
pub struct TableLeaf {
    pub(crate) source: Rc<dyn ElementSource>,
    pub columns: Vec<TableColumn>,
    pub selected: Option<Binding<usize>>,
    pub window: Option<WindowHandle>,
    pub show_header: bool,
    pub style: Binding<Style>,
    pub styles: RowStyles,
}

/// A leaf measured and painted by user callbacks.
#[derive(Clone)]
pub struct CustomLeaf {
    pub measure: MeasureFn,
    /// Preferred width when the leaf sits in a row without a width hint.
    pub intrinsic_width: u16,
    pub paint: PaintFn,
}

/// Conditional: `then` when the condition holds, otherwise `otherwise`.
pub struct ShowNode {
    pub when: Binding<bool>,
    pub then: Box<Node>,
    pub otherwise: Option<Box<Node>>,
}

/// Multi-way conditional keyed by a string.
pub struct SwitchNode {
    pub on: Binding<String>,
    pub cases: Vec<(String, Node)>,
    pub default: Option<Box<Node>>,
}

/// Repeats a body once per element of a sequence.
pub struct EachNode {
    pub(crate) source: Rc<dyn ElementSource>,
    pub(crate) render: RenderFn,
    /// Rows between element bodies.
    pub gap: u16,
}

/// Where an overlay is placed on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    Center,
    /// Fixed surface position of the overlay's top-left corner.
    At(u16, u16),
}

/// A body painted after the main tree, over everything else.
pub struct OverlayNode {
    pub body: Box<Node>,
    pub visible: Binding<bool>,
    pub anchor: Anchor,
}

// =============================================================================
// Builders
// =============================================================================

fn node(kind: NodeKind) -> Node {
    Node {
        hints: Hints::default(),
        kind,
    }
}

fn container(direction: Direction, children: impl IntoIterator<Item = Node>) -> Node {
    node(NodeKind::Container(ContainerNode {
        direction,
        gap: 0,
        padding: Edges::ZERO,
        border: BorderStyle::None,
        border_style: Style::new(),
        cascade: None,
        fill: None,
        children: children.into_iter().collect(),
    }))
}

/// Vertical container.
pub fn col(children: impl IntoIterator<Item = Node>) -> Node {
    container(Direction::Column, children)
}

/// Horizontal container.
pub fn row(children: impl IntoIterator<Item = Node>) -> Node {
    container(Direction::Row, children)
}

/// Single-line text.
pub fn text(content: impl Into<Binding<String>>) -> Node {
    node(NodeKind::Text(TextLeaf {
        content: content.into(),
        style: Binding::default(),
        align: TextAlign::Left,
    }))
}

/// Progress bar showing `value / total`.
pub fn gauge(value: impl Into<Binding<f64>>, total: impl Into<Binding<f64>>) -> Node {
    node(NodeKind::Gauge(GaugeLeaf {
        value: value.into(),
        total: total.into(),
        style: Binding::default(),
        empty_style: Style::new(),
    }))
}

/// Horizontal rule.
pub fn rule() -> Node {
    node(NodeKind::Rule(RuleLeaf {
        style: Binding::default(),
        glyph: None,
    }))
}

/// A windowed list showing `label(element)` per row.
pub fn list<E: 'static>(items: Sequence<E>, label: impl Fn(&E) -> String + 'static) -> Node {
    node(NodeKind::List(ListLeaf {
        source: Rc::new(items),
        label: element_reader(label),
        selected: None,
        window: None,
        header: None,
        style: Binding::default(),
        styles: RowStyles::default(),
    }))
}

/// A windowed table with the given columns.
pub fn table<E: 'static>(items: Sequence<E>, columns: impl IntoIterator<Item = Column<E>>) -> Node {
    node(NodeKind::Table(TableLeaf {
        source: Rc::new(items),
        columns: columns.into_iter().map(Column::erase).collect(),
        selected: None,
        window: None,
        show_header: true,
        style: Binding::default(),
        styles: RowStyles::default(),
    }))
}

/// A leaf with caller-defined measurement and painting.
///
/// Inside an `each` body both callbacks receive the current element's scope,
/// so bindings captured from the item (`item.field(..)`) can be read with
/// [`Binding::read`].
pub fn custom(
    measure: impl Fn(u16, &Scope<'_>) -> u16 + 'static,
    paint: impl Fn(&mut Canvas<'_>, &Scope<'_>) + 'static,
) -> Node {
    node(NodeKind::Custom(CustomLeaf {
        measure: Rc::new(measure),
        intrinsic_width: 0,
        paint: Rc::new(paint),
    }))
}

/// Render `then` while `when` holds, else `otherwise` (or nothing).
///
/// The conditional is transparent to layout: it takes the size hints of the
/// active branch's root, and none of its own.
pub fn show(when: impl Into<Binding<bool>>, then: Node, otherwise: Option<Node>) -> Node {
    node(NodeKind::Show(ShowNode {
        when: when.into(),
        then: Box::new(then),
        otherwise: otherwise.map(Box::new),
    }))
}

/// Render the case whose key equals `on`, else the default case (or
/// nothing). Add cases with [`Node::case`] and [`Node::default_case`].
pub fn switch(on: impl Into<Binding<String>>) -> Node {
    node(NodeKind::Switch(SwitchNode {
        on: on.into(),
        cases: Vec::new(),
        default: None,
    }))
}

/// Repeat `render(item)` for every element of `items`.
///
/// `render` is called once, at compile time, with a placeholder. Bindings
/// derived from the placeholder read the current element every frame.
pub fn each<E: 'static>(items: Sequence<E>, render: impl Fn(Item<E>) -> Node + 'static) -> Node {
    node(NodeKind::Each(EachNode {
        source: Rc::new(items),
        render: Rc::new(move |level| render(Item::new(level))),
        gap: 0,
    }))
}

/// Paint `body` above the main tree while `visible` holds.
pub fn overlay(body: Node, visible: impl Into<Binding<bool>>) -> Node {
    node(NodeKind::Overlay(OverlayNode {
        body: Box::new(body),
        visible: visible.into(),
        anchor: Anchor::Center,
    }))
}

/// A node that takes no space.
pub fn empty() -> Node {
    node(NodeKind::Empty)
}

// =============================================================================
// Chained Setters
// =============================================================================

impl Node {
    // -------------------------------------------------------------------------
    // Hints
    // -------------------------------------------------------------------------

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.hints.id = Some(id.into());
        self
    }

    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.hints.width = width.into();
        self
    }

    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.hints.height = height.into();
        self
    }

    pub fn flex(mut self, weight: f32) -> Self {
        self.hints.flex = weight;
        self
    }

    pub fn margin(mut self, margin: Edges) -> Self {
        self.hints.margin = margin;
        self
    }

    // -------------------------------------------------------------------------
    // Containers
    // -------------------------------------------------------------------------

    pub fn gap(mut self, gap: u16) -> Self {
        match &mut self.kind {
            NodeKind::Container(c) => c.gap = gap,
            NodeKind::Each(e) => e.gap = gap,
            _ => {}
        }
        self
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        if let NodeKind::Container(c) = &mut self.kind {
            c.padding = padding;
        }
        self
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        if let NodeKind::Container(c) = &mut self.kind {
            c.border = border;
        }
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        if let NodeKind::Container(c) = &mut self.kind {
            c.border_style = style;
        }
        self
    }

    /// Style inherited by every descendant of this container.
    pub fn cascade(mut self, style: Style) -> Self {
        if let NodeKind::Container(c) = &mut self.kind {
            c.cascade = Some(style);
        }
        self
    }

    /// Background of this container, inherited by its descendants.
    pub fn fill(mut self, color: Rgba) -> Self {
        if let NodeKind::Container(c) = &mut self.kind {
            c.fill = Some(color);
        }
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        if let NodeKind::Container(c) = &mut self.kind {
            c.children.push(child);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Leaves
    // -------------------------------------------------------------------------

    /// Local style of a text, gauge, rule, list or table.
    pub fn style(mut self, style: impl Into<Binding<Style>>) -> Self {
        let style = style.into();
        match &mut self.kind {
            NodeKind::Text(t) => t.style = style,
            NodeKind::Gauge(g) => g.style = style,
            NodeKind::Rule(r) => r.style = style,
            NodeKind::List(l) => l.style = style,
            NodeKind::Table(t) => t.style = style,
            _ => {}
        }
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        if let NodeKind::Text(t) = &mut self.kind {
            t.align = align;
        }
        self
    }

    /// Style of the unfilled part of a gauge.
    pub fn empty_style(mut self, style: Style) -> Self {
        if let NodeKind::Gauge(g) = &mut self.kind {
            g.empty_style = style;
        }
        self
    }

    pub fn glyph(mut self, glyph: char) -> Self {
        if let NodeKind::Rule(r) = &mut self.kind {
            r.glyph = Some(glyph);
        }
        self
    }

    /// Preferred width of a custom leaf.
    pub fn intrinsic_width(mut self, width: u16) -> Self {
        if let NodeKind::Custom(c) = &mut self.kind {
            c.intrinsic_width = width;
        }
        self
    }

    // -------------------------------------------------------------------------
    // Lists and tables
    // -------------------------------------------------------------------------

    /// Highlighted row; the window follows it.
    pub fn selected(mut self, selected: impl Into<Binding<usize>>) -> Self {
        let selected = Some(selected.into());
        match &mut self.kind {
            NodeKind::List(l) => l.selected = selected,
            NodeKind::Table(t) => t.selected = selected,
            _ => {}
        }
        self
    }

    pub fn window(mut self, window: WindowHandle) -> Self {
        match &mut self.kind {
            NodeKind::List(l) => l.window = Some(window),
            NodeKind::Table(t) => t.window = Some(window),
            _ => {}
        }
        self
    }

    /// Header line above a list.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        if let NodeKind::List(l) = &mut self.kind {
            l.header = Some(header.into());
        }
        self
    }

    /// Hide or show the column titles of a table.
    pub fn show_header(mut self, show: bool) -> Self {
        if let NodeKind::Table(t) = &mut self.kind {
            t.show_header = show;
        }
        self
    }

    pub fn selected_style(mut self, style: Style) -> Self {
        match &mut self.kind {
            NodeKind::List(l) => l.styles.selected = style,
            NodeKind::Table(t) => t.styles.selected = style,
            _ => {}
        }
        self
    }

    pub fn header_style(mut self, style: Style) -> Self {
        match &mut self.kind {
            NodeKind::List(l) => l.styles.header = style,
            NodeKind::Table(t) => t.styles.header = style,
            _ => {}
        }
        self
    }

    // -------------------------------------------------------------------------
    // Control flow
    // -------------------------------------------------------------------------

    /// Add a switch case.
    pub fn case(mut self, key: impl Into<String>, body: Node) -> Self {
        if let NodeKind::Switch(s) = &mut self.kind {
            s.cases.push((key.into(), body));
        }
        self
    }

    /// Switch body used when no case matches.
    pub fn default_case(mut self, body: Node) -> Self {
        if let NodeKind::Switch(s) = &mut self.kind {
            s.default = Some(Box::new(body));
        }
        self
    }

    /// Overlay placement.
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        if let NodeKind::Overlay(o) = &mut self.kind {
            o.anchor = anchor;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_builders_set_hints() {
        let n = text("hi").id("title").width(10).flex(2.0).margin(Edges::all(1));
        assert_eq!(n.hints.id.as_deref(), Some("title"));
        assert_eq!(n.hints.width, Dimension::Cells(10));
        assert_eq!(n.hints.flex, 2.0);
        assert_eq!(n.hints.margin, Edges::all(1));
        assert_eq!(n.kind.name(), "text");
    }

    #[test]
    fn test_container_setters() {
        let n = col([text("a")])
            .gap(2)
            .padding(Edges::symmetric(1, 2))
            .border(BorderStyle::Single)
            .child(text("b"));
        let NodeKind::Container(c) = &n.kind else {
            panic!("expected container");
        };
        assert_eq!(c.direction, Direction::Column);
        assert_eq!(c.gap, 2);
        assert_eq!(c.padding, Edges::symmetric(1, 2));
        assert_eq!(c.border, BorderStyle::Single);
        assert_eq!(c.children.len(), 2);
    }

    #[test]
    fn test_kind_specific_setters_ignored_elsewhere() {
        let n = text("a").gap(3).header("x").case("k", empty());
        assert!(matches!(n.kind, NodeKind::Text(_)));
    }

    #[test]
    fn test_switch_cases() {
        let n = switch("a").case("a", text("A")).case("b", text("B")).default_case(text("?"));
        let NodeKind::Switch(s) = &n.kind else {
            panic!("expected switch");
        };
        assert_eq!(s.cases.len(), 2);
        assert!(s.default.is_some());
    }

    #[test]
    fn test_table_columns_erase_element_type() {
        let rows = Rc::new(RefCell::new(vec![(1u32, "one".to_string())]));
        let columns: [Column<(u32, String)>; 2] = [
            Column::new("N", |r: &(u32, String)| r.0.to_string()).width(4),
            Column::new("Name", |r: &(u32, String)| r.1.clone()).flex(1.0),
        ];
        let n = table(Sequence::new(rows.clone()), columns);
        let NodeKind::Table(t) = &n.kind else {
            panic!("expected table");
        };
        assert_eq!(t.columns.len(), 2);
        assert_eq!(t.columns[0].width, Dimension::Cells(4));
        let row = rows.borrow();
        let element: &dyn std::any::Any = &row[0];
        assert_eq!((t.columns[1].read)(element).as_deref(), Some("one"));
        assert_eq!(t.source.len(&Scope::root()), 1);
    }
}
