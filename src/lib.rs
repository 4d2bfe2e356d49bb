//! # spark-template
//!
//! Compiled-template terminal UI engine for Rust.
//!
//! A UI is described once as a tree of [`Node`]s, compiled into a flat
//! [`Template`], and then executed every frame against live data. Values
//! reach the template through [`Binding`]s: literals, getters,
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals) signals, or
//! typed accessors into the current element of an iteration.
//!
//! ## Architecture
//!
//! ```text
//! Node tree ──compile──▶ Template { ops, blocks, geometry }
//!                              │
//!               execute ───────┤ width → height → flex → paint → overlays
//!                              ▼
//!                           Surface (FrameBuffer) ──▶ TerminalRenderer
//! ```
//!
//! ## Example
//!
//! ```
//! use spark_template::{FrameBuffer, Template, col, row, text};
//!
//! let ui = col([
//!     text("Header"),
//!     row([text("left").flex(1.0), text("right").flex(2.0)]).flex(1.0),
//!     text("Footer"),
//! ]);
//!
//! let mut template = Template::compile(ui).unwrap();
//! let mut buffer = FrameBuffer::new(30, 5);
//! template.execute(&mut buffer, 30, 5);
//!
//! assert_eq!(buffer.row_text(0).trim_end(), "Header");
//! assert_eq!(buffer.row_text(4).trim_end(), "Footer");
//! ```
//!
//! ## Modules
//!
//! - [`node`] - Declarative node tree and builders
//! - [`binding`] - Bindings, scopes, sequences and iteration items
//! - [`compiler`] - Node tree to op arena
//! - [`template`] - Compiled ops, blocks and per-frame geometry
//! - [`layout`] - Width, height and flex passes
//! - [`renderer`] - Surfaces, painting and the terminal presenter
//! - [`window`] - Scroll windows for lists and tables

pub mod binding;
pub mod compiler;
pub mod config;
pub mod error;
pub mod layout;
pub mod node;
mod pipeline;
pub mod renderer;
pub mod template;
pub mod types;
pub mod window;

// Re-export commonly used items
pub use binding::{Binding, BindingKind, Item, Scope, Sequence};
pub use config::EngineConfig;
pub use error::{CompileError, CompileResult};
pub use node::{
    Anchor, Column, Node, col, custom, each, empty, gauge, list, overlay, row, rule, show, switch,
    table, text,
};
pub use renderer::{Canvas, CellStyle, FrameBuffer, Surface, TerminalRenderer};
pub use template::{BlockId, Geometry, Template};
pub use types::{
    Attr, BorderStyle, Cell, ClipRect, Dimension, Edges, Rgba, Style, TextAlign, Transform,
};
pub use window::{Window, WindowHandle};
