//! Compile-time configuration errors.
//!
//! Everything that can be wrong with a node tree is reported once, when the
//! template is compiled. Degenerate data at render time (empty sequences,
//! zero totals, out-of-range scroll offsets) is recovered locally and never
//! surfaces here.

use thiserror::Error;

/// A malformed node tree, detected by the compiler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// An element accessor was used outside the iteration it was created for.
    #[error("field binding over `{element}` used at iteration level {level}, but only {depth} enclosing iteration(s) exist")]
    UnboundField {
        element: &'static str,
        level: usize,
        depth: usize,
    },

    /// An element accessor reads a different type than the iteration at its level.
    #[error("field binding expects elements of `{expected}` but iteration level {level} yields `{found}`")]
    ElementTypeMismatch {
        expected: &'static str,
        found: &'static str,
        level: usize,
    },

    #[error("flex weight must be finite and non-negative, got {weight}")]
    InvalidFlex { weight: f32 },

    #[error("percentage must be within 0..=100, got {percent}")]
    InvalidPercent { percent: f32 },

    /// Overlays are painted after the main tree, outside any element scope.
    #[error("overlay declared inside an iteration body (level {level})")]
    OverlayInIteration { level: usize },

    #[error("table declares no columns")]
    EmptyTable,
}

/// Result alias for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
