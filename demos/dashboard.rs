//! Dashboard Example - a full-screen task monitor
//!
//! Demonstrates:
//! - Header / body / footer layout with flex rows
//! - A windowed task list that follows the selection
//! - A table sharing the list's selection
//! - A conditional detail pane and a help overlay
//! - Diff rendering through `TerminalRenderer`
//!
//! Keys: j/k or arrows move, space toggles done, ? shows help, q quits.
//!
//! Run with: cargo run --example dashboard

use std::cell::RefCell;
use std::io::{self, stdout};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, size};
use spark_signals::signal;
use spark_template::{
    Attr, Binding, BorderStyle, Column, Edges, FrameBuffer, Rgba, Sequence, Style, Template,
    TerminalRenderer, TextAlign, WindowHandle, col, gauge, list, overlay, row, rule, show, table,
    text,
};

#[derive(Debug, Clone)]
struct Task {
    title: String,
    owner: &'static str,
    done: bool,
}

fn tasks() -> Vec<Task> {
    let owners = ["ana", "bo", "cy", "dee"];
    (1..=40)
        .map(|i| Task {
            title: format!("Task #{i:02}"),
            owner: owners[i % owners.len()],
            done: i % 3 == 0,
        })
        .collect()
}

fn main() -> io::Result<()> {
    let items = Rc::new(RefCell::new(tasks()));
    let selected = signal(0usize);
    let help = signal(false);
    let window = WindowHandle::new(10);

    let done_count = {
        let items = items.clone();
        Binding::getter(move || items.borrow().iter().filter(|t| t.done).count() as f64)
    };
    let total = {
        let items = items.clone();
        Binding::getter(move || items.borrow().len() as f64)
    };
    let current_done = {
        let items = items.clone();
        let selected = selected.clone();
        Binding::getter(move || {
            items
                .borrow()
                .get(selected.get())
                .is_some_and(|t| t.done)
        })
    };
    let current_title = {
        let items = items.clone();
        let selected = selected.clone();
        Binding::getter(move || {
            items
                .borrow()
                .get(selected.get())
                .map(|t| t.title.clone())
                .unwrap_or_default()
        })
    };

    let accent = Style::new().fg(Rgba::CYAN).attrs(Attr::BOLD);
    let columns: [Column<Task>; 3] = [
        Column::new("Owner", |t: &Task| t.owner.to_string()).width(6u16),
        Column::new("Task", |t: &Task| t.title.clone()).flex(1.0),
        Column::new("", |t: &Task| if t.done { "✓" } else { "" }.to_string()).width(2u16),
    ];

    let ui = col([
        text("spark-template dashboard")
            .align(TextAlign::Center)
            .style(accent),
        rule(),
        row([
            col([
                text("Tasks").style(Style::new().attrs(Attr::UNDERLINE)),
                list(Sequence::new(items.clone()), |t: &Task| t.title.clone())
                    .window(window.clone())
                    .selected(selected.clone())
                    .selected_style(Style::new().attrs(Attr::INVERSE))
                    .flex(1.0),
            ])
            .border(BorderStyle::Rounded)
            .padding(Edges::symmetric(0, 1))
            .width(30u16),
            col([
                table(Sequence::new(items.clone()), columns)
                    .header_style(accent)
                    .selected(selected.clone())
                    .selected_style(Style::new().bg(Rgba::ansi(8)))
                    .flex(1.0),
                show(
                    current_done,
                    text(current_title.clone()).style(Style::new().fg(Rgba::GREEN)),
                    Some(text(current_title).style(Style::new().fg(Rgba::YELLOW))),
                ),
            ])
            .border(BorderStyle::Rounded)
            .flex(1.0),
        ])
        .gap(1)
        .flex(1.0),
        row([
            text("done ").style(Style::new().attrs(Attr::DIM)),
            gauge(done_count, total).flex(1.0),
        ]),
        text("j/k move  space toggle  ? help  q quit").style(Style::new().attrs(Attr::DIM)),
        overlay(
            col([
                text("Help").style(accent),
                text("j / k    move selection"),
                text("space    toggle done"),
                text("q        quit"),
            ])
            .border(BorderStyle::Double)
            .padding(Edges::symmetric(0, 2))
            .fill(Rgba::ansi(0)),
            help.clone(),
        ),
    ])
    .cascade(Style::new().fg(Rgba::WHITE));

    let mut template = Template::compile(ui).map_err(io::Error::other)?;

    let mut renderer = TerminalRenderer::new(stdout());
    enable_raw_mode()?;
    renderer.enter_fullscreen()?;

    let result = (|| -> io::Result<()> {
        loop {
            let (width, height) = size()?;
            let mut buffer = FrameBuffer::new(width, height);
            template.execute(&mut buffer, width, height);
            renderer.render(&buffer)?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let len = items.borrow().len();
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('j') | KeyCode::Down => {
                            selected.set((selected.get() + 1).min(len.saturating_sub(1)));
                        }
                        KeyCode::Char('k') | KeyCode::Up => {
                            selected.set(selected.get().saturating_sub(1));
                        }
                        KeyCode::Char(' ') => {
                            if let Some(task) = items.borrow_mut().get_mut(selected.get()) {
                                task.done = !task.done;
                            }
                        }
                        KeyCode::Char('?') => {
                            help.set(!help.get());
                        }
                        _ => {}
                    }
                }
                Event::Resize(..) => renderer.invalidate(),
                _ => {}
            }
        }
    })();

    renderer.exit_fullscreen()?;
    disable_raw_mode()?;
    result
}
