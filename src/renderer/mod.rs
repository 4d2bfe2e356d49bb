//! Renderer Module
//!
//! Paints a laid-out Template onto a [`Surface`]:
//!
//! - [`Surface`] / [`CellStyle`] - the cell-grid contract
//! - [`FrameBuffer`] - in-memory surface, the usual paint target
//! - [`Canvas`] - translated and clipped view handed to custom leaves
//! - [`Cascade`] - inherited style and fill
//! - [`TerminalRenderer`] - diffs frame buffers onto a terminal via crossterm
//!
//! The paint traversal itself lives in `paint.rs` as methods on the layout
//! frame, and leaf painters in `widgets.rs`.

mod buffer;
mod canvas;
mod cascade;
mod paint;
mod surface;
mod terminal;
mod widgets;

pub use buffer::FrameBuffer;
pub use canvas::Canvas;
pub use cascade::Cascade;
pub use surface::{CellStyle, Surface};
pub use terminal::TerminalRenderer;
