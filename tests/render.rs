//! End-to-end frames: compile a tree, execute it into a FrameBuffer, read
//! back the cells.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use spark_signals::signal;
use spark_template::{
    Anchor, Attr, BorderStyle, CellStyle, Column, EngineConfig, FrameBuffer, Item, Rgba, Sequence,
    Style, Surface, Template, TerminalRenderer, TextAlign, WindowHandle, col, custom, each, gauge,
    list, overlay, row, rule, show, table, text,
};

// =============================================================================
// Helpers
// =============================================================================

fn compile(root: spark_template::Node) -> Template {
    Template::compile(root).expect("tree compiles")
}

fn paint(template: &mut Template, width: u16, height: u16) -> FrameBuffer {
    let mut buffer = FrameBuffer::new(width, height);
    template.execute(&mut buffer, width, height);
    buffer
}

fn lines(buffer: &FrameBuffer) -> Vec<String> {
    buffer
        .lines()
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect()
}

fn shared<E>(items: Vec<E>) -> Rc<RefCell<Vec<E>>> {
    Rc::new(RefCell::new(items))
}

#[derive(Debug, Clone, PartialEq)]
struct Task {
    name: String,
    done: bool,
}

fn task(name: &str, done: bool) -> Task {
    Task {
        name: name.to_string(),
        done,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_header_body_footer_paint() {
    let mut t = compile(col([
        text("Header"),
        row([text("L").flex(1.0), text("R").flex(2.0)]).flex(1.0),
        text("Footer"),
    ]));
    let buffer = paint(&mut t, 30, 20);
    let rows = lines(&buffer);

    assert_eq!(rows[0], "Header");
    assert_eq!(rows[1], format!("L{}R", " ".repeat(9)));
    assert_eq!(rows[19], "Footer");
    assert!(rows[2..19].iter().all(String::is_empty));
}

#[test]
fn test_execute_is_idempotent() {
    let tasks = shared(vec![task("a", true), task("b", false)]);
    let mut t = compile(
        col([
            text("Tasks").align(TextAlign::Center),
            each(Sequence::new(tasks), |item: Item<Task>| {
                text(item.field(|t: &Task| t.name.clone()))
            }),
            gauge(1.0, 2.0),
        ])
        .border(BorderStyle::Rounded),
    );

    let first = paint(&mut t, 20, 8);
    let second = paint(&mut t, 20, 8);
    assert_eq!(first, second);
}

#[test]
fn test_fields_do_not_cross_talk() {
    let tasks = shared(vec![task("a", true), task("b", false), task("c", true)]);
    let mut t = compile(col([each(Sequence::new(tasks.clone()), |item: Item<Task>| {
        row([
            text(item.field(|t: &Task| t.name.clone())).width(6u16),
            show(item.field(|t: &Task| t.done), text("done"), Some(text("todo"))),
        ])
    })]));

    let buffer = paint(&mut t, 20, 5);
    assert_eq!(
        lines(&buffer)[..3],
        ["a     done", "b     todo", "c     done"].map(String::from)
    );

    tasks.borrow_mut()[1].done = true;
    tasks.borrow_mut().remove(0);
    let buffer = paint(&mut t, 20, 5);
    assert_eq!(lines(&buffer)[..3], ["b     done", "c     done", ""].map(String::from));
}

#[test]
fn test_custom_leaf_reads_current_element() {
    let tasks = shared(vec![task("ab", true), task("c", false), task("def", true)]);
    let mut t = compile(col([each(Sequence::new(tasks), |item: Item<Task>| {
        let name = item.field(|t: &Task| t.name.clone());
        let done = item.field(|t: &Task| t.done);
        custom(
            move |_, scope| if done.read(scope) { 2 } else { 1 },
            move |canvas, scope| {
                let width = canvas.width();
                canvas.write_text(0, 0, &name.read(scope), CellStyle::default(), width);
            },
        )
    })]));

    assert_eq!(
        lines(&paint(&mut t, 10, 6)),
        ["ab", "", "c", "def", "", ""].map(String::from)
    );
}

#[derive(Debug, Clone)]
struct Group {
    name: String,
    members: Vec<String>,
}

#[test]
fn test_nested_iteration_reads_both_levels() {
    let groups = shared(vec![
        Group {
            name: "x".into(),
            members: vec!["x1".into(), "x2".into()],
        },
        Group {
            name: "y".into(),
            members: vec!["y1".into()],
        },
    ]);

    let mut t = compile(col([each(Sequence::new(groups), |group: Item<Group>| {
        col([
            text(group.field(|g: &Group| g.name.clone())),
            each(
                group.items(|g: &Group| g.members.as_slice()),
                move |member: Item<String>| {
                    row([
                        text(group.field(|g: &Group| g.name.to_uppercase())).width(2u16),
                        text(member.field(|m: &String| m.clone())),
                    ])
                },
            ),
        ])
    })]));

    let buffer = paint(&mut t, 10, 6);
    assert_eq!(
        lines(&buffer),
        ["x", "X x1", "X x2", "y", "Y y1", ""].map(String::from)
    );
}

// =============================================================================
// Leaves
// =============================================================================

#[test]
fn test_text_truncates_with_ellipsis() {
    let mut t = compile(row([text("Hello world").width(6u16), text("|")]));
    assert_eq!(lines(&paint(&mut t, 10, 1))[0], "Hello…|");

    let config = EngineConfig::default().with_ellipsis(None);
    let mut t = Template::compile_with(row([text("Hello world").width(6u16)]), config)
        .expect("tree compiles");
    assert_eq!(lines(&paint(&mut t, 10, 1))[0], "Hello");
}

#[test]
fn test_text_alignment() {
    let mut t = compile(col([
        text("ab").align(TextAlign::Center),
        text("ab").align(TextAlign::Right),
    ]));
    let rows = lines(&paint(&mut t, 6, 2));
    assert_eq!(rows[0], "  ab");
    assert_eq!(rows[1], "    ab");
}

#[test]
fn test_text_transform_from_cascade() {
    let mut t = compile(
        col([text("shout")]).cascade(Style::new().transform(spark_template::Transform::Uppercase)),
    );
    assert_eq!(lines(&paint(&mut t, 10, 1))[0], "SHOUT");
}

#[test]
fn test_gauge_and_rule() {
    let mut t = compile(col([gauge(5.0, 10.0), gauge(3.0, 0.0), rule()]));
    let rows = lines(&paint(&mut t, 10, 3));
    assert_eq!(rows[0], "█████░░░░░");
    // Zero total counts as 1: fully filled.
    assert_eq!(rows[1], "██████████");
    assert_eq!(rows[2], "──────────");
}

#[test]
fn test_gauge_label() {
    let config = EngineConfig::default()
        .with_gauge_label(true)
        .with_gauge_glyphs('#', '.');
    let mut t = Template::compile_with(col([gauge(1.0, 4.0)]), config).expect("tree compiles");
    assert_eq!(lines(&paint(&mut t, 13, 1))[0], "##......  25%");
}

#[test]
fn test_custom_leaf_paints_through_clipped_canvas() {
    let mut t = compile(row([
        custom(
            |_, _| 1,
            |canvas, _| {
                assert_eq!(canvas.width(), 3);
                canvas.write_text(0, 0, "abcdefgh", CellStyle::default(), 8);
                canvas.set_cell(5, 0, '!', CellStyle::default());
            },
        )
        .width(3u16),
        text("|"),
    ]));
    assert_eq!(lines(&paint(&mut t, 10, 1))[0], "abc|");
}

// =============================================================================
// Lists & tables
// =============================================================================

#[test]
fn test_list_follows_selection() {
    let items = shared((0..100u32).collect::<Vec<_>>());
    let handle = WindowHandle::new(5);
    let selected = signal(42usize);
    let mut t = compile(col([list(Sequence::new(items), |n: &u32| n.to_string())
        .window(handle.clone())
        .selected(selected.clone())
        .selected_style(Style::new().attrs(Attr::INVERSE))]));

    let buffer = paint(&mut t, 10, 5);
    assert_eq!(lines(&buffer), ["38", "39", "40", "41", "42"].map(String::from));
    assert_eq!(handle.get().offset(100), 38);
    assert_eq!(handle.get().max_visible(), 5);
    assert_eq!(buffer.get_cell(0, 4).map(|c| c.attrs), Some(Attr::INVERSE));
    assert_eq!(buffer.get_cell(0, 3).map(|c| c.attrs), Some(Attr::NONE));

    selected.set(3);
    let buffer = paint(&mut t, 10, 5);
    assert_eq!(lines(&buffer)[0], "3");
}

#[test]
fn test_list_scrolls_and_clamps_after_shrink() {
    let items = shared((0..100u32).collect::<Vec<_>>());
    let handle = WindowHandle::new(5);
    let mut t = compile(col([
        list(Sequence::new(items.clone()), |n: &u32| format!("item {n}"))
            .window(handle.clone())
            .header("Items"),
    ]));

    assert!(handle.scroll_by(10, 100));
    let buffer = paint(&mut t, 12, 6);
    assert_eq!(
        lines(&buffer),
        ["Items", "item 10", "item 11", "item 12", "item 13", "item 14"].map(String::from)
    );

    items.borrow_mut().truncate(12);
    let buffer = paint(&mut t, 12, 6);
    assert_eq!(lines(&buffer)[1], "item 7");
    assert_eq!(lines(&buffer)[5], "item 11");
}

#[test]
fn test_stretched_list_paints_only_window_rows() {
    let items = shared((0..50u32).collect::<Vec<_>>());
    let handle = WindowHandle::new(3);
    let mut t = compile(col([row([
        list(Sequence::new(items.clone()), |n: &u32| n.to_string())
            .window(handle.clone())
            .width(4u16),
        col((0..8).map(|i| text(format!("s{i}")))),
    ])]));

    let rows = lines(&paint(&mut t, 10, 8));
    assert_eq!(rows[..4], ["0   s0", "1   s1", "2   s2", "    s3"].map(String::from));
    assert_eq!(handle.get().max_visible(), 3);
    assert_eq!(handle.get().range(50), 0..3);
}

#[test]
fn test_flex_list_and_table_paint_only_window_rows() {
    let items = shared((0..50u32).collect::<Vec<_>>());
    let columns: [Column<u32>; 1] = [Column::new("N", |n: &u32| n.to_string())];
    let mut t = compile(row([
        col([
            list(Sequence::new(items.clone()), |n: &u32| n.to_string())
                .window(WindowHandle::new(3))
                .flex(1.0),
            text("end"),
        ])
        .width(4u16),
        table(Sequence::new(items), columns)
            .window(WindowHandle::new(2))
            .flex(1.0),
    ]));

    let rows = lines(&paint(&mut t, 10, 8));
    assert_eq!(
        rows,
        ["0   N", "1   0", "2   1", "", "", "", "", "end"].map(String::from)
    );
}

#[derive(Debug, Clone)]
struct Fruit {
    name: &'static str,
    qty: u32,
}

#[test]
fn test_table_columns() {
    let fruit = shared(vec![
        Fruit {
            name: "apple",
            qty: 3,
        },
        Fruit {
            name: "blueberry",
            qty: 120,
        },
    ]);
    let columns: [Column<Fruit>; 2] = [
        Column::new("Name", |f: &Fruit| f.name.to_string()).width(6u16),
        Column::new("Qty", |f: &Fruit| f.qty.to_string()).flex(1.0),
    ];
    let mut t = compile(col([table(Sequence::new(fruit), columns)]));

    let rows = lines(&paint(&mut t, 20, 3));
    assert_eq!(rows[0], "Name   Qty");
    assert_eq!(rows[1], "apple  3");
    assert_eq!(rows[2], "blueb… 120");
}

// =============================================================================
// Containers, cascade & clipping
// =============================================================================

#[test]
fn test_border_and_fill() {
    let mut t = compile(
        col([text("hi")])
            .border(BorderStyle::Single)
            .fill(Rgba::BLUE),
    );
    let buffer = paint(&mut t, 4, 3);
    assert_eq!(lines(&buffer), ["┌──┐", "│hi│", "└──┘"].map(String::from));
    assert_eq!(buffer.get_cell(1, 1).map(|c| c.bg), Some(Rgba::BLUE));
    assert_eq!(buffer.get_cell(2, 1).map(|c| c.bg), Some(Rgba::BLUE));
}

#[test]
fn test_cascade_reaches_descendants_only() {
    let mut t = compile(col([
        row([text("in").style(Style::new().attrs(Attr::ITALIC))])
            .cascade(Style::new().fg(Rgba::RED).attrs(Attr::BOLD)),
        text("out"),
    ]));
    let buffer = paint(&mut t, 5, 2);

    let inner = buffer.get_cell(0, 0).expect("cell");
    assert_eq!(inner.fg, Rgba::RED);
    assert_eq!(inner.attrs, Attr::BOLD | Attr::ITALIC);

    let sibling = buffer.get_cell(0, 1).expect("cell");
    assert_eq!(sibling.fg, Rgba::TERMINAL_DEFAULT);
    assert_eq!(sibling.attrs, Attr::NONE);
}

#[test]
fn test_children_clipped_to_container() {
    let mut t = compile(col([
        col([text("a"), text("b"), text("c")]).height(1u16),
        text("z"),
    ]));
    assert_eq!(lines(&paint(&mut t, 3, 3)), ["a", "z", ""].map(String::from));
}

#[test]
fn test_conditional_switches_between_frames() {
    let logged_in = signal(false);
    let mut t = compile(col([
        show(logged_in.clone(), text("Welcome"), Some(text("Login"))),
        text("--"),
    ]));
    assert_eq!(lines(&paint(&mut t, 10, 2)), ["Login", "--"].map(String::from));

    logged_in.set(true);
    assert_eq!(lines(&paint(&mut t, 10, 2)), ["Welcome", "--"].map(String::from));
}

// =============================================================================
// Overlays
// =============================================================================

#[test]
fn test_overlay_centered_over_cleared_rect() {
    let open = signal(true);
    let mut t = compile(col([
        text("x".repeat(20)),
        text("x".repeat(20)),
        text("x".repeat(20)),
        overlay(col([text("Hi")]).border(BorderStyle::Single), open.clone()),
    ]));

    let buffer = paint(&mut t, 20, 5);
    let rows = lines(&buffer);
    assert_eq!(rows[1], "xxxxxxxx┌──┐xxxxxxxx");
    assert_eq!(rows[2], "xxxxxxxx│Hi│xxxxxxxx");
    assert_eq!(rows[3], "        └──┘");

    open.set(false);
    let rows = lines(&paint(&mut t, 20, 5));
    assert_eq!(rows[1], "x".repeat(20));
    assert_eq!(rows[3], "");
}

#[test]
fn test_overlay_explicit_size_and_anchor() {
    let mut t = compile(col([
        text("base"),
        overlay(text("pop").id("popup"), true)
            .width(5u16)
            .anchor(Anchor::At(2, 1))
            .id("overlay"),
    ]));

    let rows = lines(&paint(&mut t, 10, 3));
    assert_eq!(rows[0], "base");
    assert_eq!(rows[1], "  pop");

    let popup = t.find("popup").and_then(|i| t.bounds(i));
    assert_eq!(popup, Some(spark_template::ClipRect::new(2, 1, 5, 1)));
}

// =============================================================================
// Terminal
// =============================================================================

#[test]
fn test_terminal_renderer_diffs_frames() {
    let title = signal("one".to_string());
    let mut t = compile(col([text(title.clone()), text("static")]));
    let mut renderer = TerminalRenderer::new(Vec::new());

    let buffer = paint(&mut t, 8, 2);
    assert_eq!(renderer.render(&buffer).ok(), Some(16));

    title.set("two".to_string());
    let buffer = paint(&mut t, 8, 2);
    assert_eq!(renderer.render(&buffer).ok(), Some(3));

    let out = String::from_utf8(renderer.into_inner()).unwrap_or_default();
    assert!(out.contains("static"));
    assert!(out.contains("two"));
}
