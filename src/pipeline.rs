//! Frame Pipeline
//!
//! One frame of a Template:
//!
//! ```text
//! clear overlay queue → width → height → flex → paint main tree → paint overlays
//! ```
//!
//! Nothing is cached between frames except the geometry array itself, which
//! is fully recomputed. Executing twice against unchanged data produces the
//! same cells.

use crate::binding::Scope;
use crate::layout::{Extent, Frame};
use crate::renderer::Surface;
use crate::template::{BlockId, Template};
use crate::types::ClipRect;

impl Template {
    /// Lay out and paint one frame into `surface`, using `width` x `height`
    /// cells from its top-left corner.
    pub fn execute(&mut self, surface: &mut dyn Surface, width: u16, height: u16) {
        let _span = tracing::trace_span!("execute", width, height).entered();

        let mut frame = self.frame();
        {
            let _span = tracing::trace_span!("layout").entered();
            frame.layout_main(width, height);
        }

        let _span = tracing::trace_span!("paint").entered();
        let clip = ClipRect::new(0, 0, width, height).intersect(&surface.bounds());
        frame.paint_block(BlockId::MAIN, (0, 0), clip, &Scope::root(), surface);
        if !frame.overlays.is_empty() {
            frame.paint_overlays(surface);
        }
    }

    /// Lay out the main tree without painting.
    ///
    /// Iteration bodies are laid out per element during paint, so their
    /// geometry is only meaningful after [`execute`](Self::execute).
    pub fn layout(&mut self, width: u16, height: u16) {
        let _span = tracing::trace_span!("layout", width, height).entered();
        self.frame().layout_main(width, height);
    }

    fn frame(&mut self) -> Frame<'_> {
        let Template {
            ops,
            geometry,
            blocks,
            overlays,
            config,
        } = self;
        overlays.clear();
        Frame {
            ops,
            blocks,
            geometry,
            config,
            overlays,
        }
    }
}

impl Frame<'_> {
    fn layout_main(&mut self, width: u16, height: u16) {
        let height = if self.config.constrain_height {
            Extent::Within(height)
        } else {
            Extent::Fit(height)
        };
        self.layout_block(BlockId::MAIN, Extent::Within(width), height, &Scope::root());
    }
}
