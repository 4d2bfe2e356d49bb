//! Benchmark Example - Stress test spark-template
//!
//! Tests:
//! - Template compilation throughput
//! - Layout computation at scale
//! - Full frame execution (layout + paint)
//! - Windowed lists over large sequences
//! - Terminal diff output
//!
//! Run with: cargo run --example benchmark --release

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Instant;

use spark_signals::signal;
use spark_template::{
    Binding, BorderStyle, FrameBuffer, Item, Node, Sequence, Style, Template, TerminalRenderer,
    WindowHandle, col, each, gauge, list, row, text,
};

const WIDTH: u16 = 200;
const HEIGHT: u16 = 50;

fn main() {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║           spark-template Benchmark Suite                 ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    bench_compile();
    bench_layout();
    bench_execute();
    bench_windowed_list();
    bench_iteration();
    bench_terminal_diff();

    println!("\n══════════════════════════════════════════════════════════");
    println!("Benchmark complete!");
}

/// Rows of bordered boxes, ten per row.
fn grid(count: usize) -> Node {
    col((0..count / 10).map(|r| {
        row((0..10).map(move |c| {
            col([text(format!("{r}:{c}"))])
                .border(BorderStyle::Single)
                .width(10u16)
        }))
    }))
}

fn bench_compile() {
    println!("┌──────────────────────────────────────────────────────────┐");
    println!("│ 1. Template Compilation                                  │");
    println!("└──────────────────────────────────────────────────────────┘");

    for count in [100, 1_000, 10_000, 50_000] {
        let start = Instant::now();
        let template = match Template::compile(grid(count)) {
            Ok(template) => template,
            Err(err) => {
                println!("  compile failed: {err}");
                return;
            }
        };
        let elapsed = start.elapsed();
        let per_op = elapsed.as_nanos() as f64 / template.ops().len().max(1) as f64;

        println!(
            "  {:>6} nodes: {:>8.2?}  ({} ops, {:.0} ns/op)",
            count,
            elapsed,
            template.ops().len(),
            per_op
        );
    }
    println!();
}

fn bench_layout() {
    println!("┌──────────────────────────────────────────────────────────┐");
    println!("│ 2. Layout Computation                                    │");
    println!("└──────────────────────────────────────────────────────────┘");

    for count in [100, 500, 1_000, 5_000] {
        let Ok(mut template) = Template::compile(grid(count)) else {
            continue;
        };

        let iterations = 100;
        let start = Instant::now();
        for _ in 0..iterations {
            template.layout(WIDTH, HEIGHT);
        }
        let per_layout = start.elapsed() / iterations;

        println!(
            "  {:>5} nodes: {:>8.2?}/layout  ({:.3} ms)",
            count,
            per_layout,
            per_layout.as_secs_f64() * 1000.0
        );
    }
    println!();
}

fn bench_execute() {
    println!("┌──────────────────────────────────────────────────────────┐");
    println!("│ 3. Full Frame (layout + paint)                           │");
    println!("└──────────────────────────────────────────────────────────┘");

    let tick = signal(0.0f64);
    let ui = col([
        text("header").style(Style::new()),
        row([grid(200).flex(1.0), grid(200).flex(1.0)]).flex(1.0),
        gauge(tick.clone(), 1000.0),
    ]);
    let Ok(mut template) = Template::compile(ui) else {
        return;
    };
    let mut buffer = FrameBuffer::new(WIDTH, HEIGHT);

    for frames in [10, 100, 1_000] {
        let start = Instant::now();
        for i in 0..frames {
            tick.set(f64::from(i % 1000));
            buffer.clear();
            template.execute(&mut buffer, WIDTH, HEIGHT);
        }
        let elapsed = start.elapsed();
        let per_frame = elapsed / frames;
        let fps = 1.0 / per_frame.as_secs_f64().max(f64::EPSILON);

        println!(
            "  {:>5} frames: {:>8.2?}  ({:>8.2?}/frame, {:.0} fps)",
            frames, elapsed, per_frame, fps
        );
    }
    println!();
}

fn bench_windowed_list() {
    println!("┌──────────────────────────────────────────────────────────┐");
    println!("│ 4. Windowed List over Large Sequences                    │");
    println!("└──────────────────────────────────────────────────────────┘");

    for total in [1_000usize, 100_000, 1_000_000] {
        let items = Rc::new(RefCell::new((0..total).collect::<Vec<usize>>()));
        let selected = signal(0usize);
        let ui = col([list(Sequence::new(items), |n: &usize| format!("row {n}"))
            .window(WindowHandle::new(40))
            .selected(selected.clone())]);
        let Ok(mut template) = Template::compile(ui) else {
            continue;
        };
        let mut buffer = FrameBuffer::new(WIDTH, HEIGHT);

        let frames = 1_000u32;
        let start = Instant::now();
        for i in 0..frames {
            selected.set((i as usize * 997) % total);
            template.execute(&mut buffer, WIDTH, HEIGHT);
        }
        let per_frame = start.elapsed() / frames;

        println!("  {:>9} items: {:>8.2?}/frame", total, per_frame);
    }
    println!();
}

fn bench_iteration() {
    println!("┌──────────────────────────────────────────────────────────┐");
    println!("│ 5. Iteration Bodies                                      │");
    println!("└──────────────────────────────────────────────────────────┘");

    for total in [10usize, 100, 1_000] {
        let items = Rc::new(RefCell::new(
            (0..total).map(|i| (format!("name {i}"), i)).collect::<Vec<(String, usize)>>(),
        ));
        let ui = col([each(Sequence::new(items), |item: Item<(String, usize)>| {
            row([
                text(item.field(|(name, _): &(String, usize)| name.clone())).flex(1.0),
                text(item.field(|(_, n): &(String, usize)| n.to_string())).width(8u16),
            ])
        })]);
        let Ok(mut template) = Template::compile(ui) else {
            continue;
        };
        let mut buffer = FrameBuffer::new(WIDTH, HEIGHT);

        let frames = 200u32;
        let start = Instant::now();
        for _ in 0..frames {
            template.execute(&mut buffer, WIDTH, HEIGHT);
        }
        let per_frame = start.elapsed() / frames;

        println!("  {:>5} elements: {:>8.2?}/frame", total, per_frame);
    }
    println!();
}

fn bench_terminal_diff() {
    println!("┌──────────────────────────────────────────────────────────┐");
    println!("│ 6. Terminal Diff Output                                  │");
    println!("└──────────────────────────────────────────────────────────┘");

    let counter = signal(0u32);
    let ui = col([
        text(Binding::getter({
            let counter = counter.clone();
            move || format!("frame {}", counter.get())
        })),
        grid(100).flex(1.0),
    ]);
    let Ok(mut template) = Template::compile(ui) else {
        return;
    };
    let mut renderer = TerminalRenderer::new(io::sink());
    let mut buffer = FrameBuffer::new(WIDTH, HEIGHT);

    let frames = 500u32;
    let mut cells = 0usize;
    let start = Instant::now();
    for i in 0..frames {
        counter.set(i);
        template.execute(&mut buffer, WIDTH, HEIGHT);
        cells += renderer.render(&buffer).unwrap_or(0);
    }
    let per_frame = start.elapsed() / frames;

    println!(
        "  {:>5} frames: {:>8.2?}/frame  ({} cells written)",
        frames, per_frame, cells
    );
    println!();
}
