//! Per-op layout results, recomputed every frame.

use super::BlockId;

/// Final box of one op for the current frame.
///
/// `local_x` / `local_y` are relative to the parent's border-box origin; for
/// a block root, relative to the owning op's origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    pub local_x: u16,
    pub local_y: u16,
    /// Height before an explicit height hint overrode it.
    pub content_height: u16,
    /// Takes part in layout and paint this frame.
    pub visible: bool,
    /// Active branch of a conditional or switch.
    pub branch: Option<BlockId>,
}

impl Geometry {
    /// Zero size, invisible, no branch.
    pub const HIDDEN: Self = Self {
        width: 0,
        height: 0,
        local_x: 0,
        local_y: 0,
        content_height: 0,
        visible: false,
        branch: None,
    };
}
