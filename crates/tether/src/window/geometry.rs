//! Window position and size

use serde::{Deserialize, Serialize};

/// Position and size of a window in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Rectangle {
    /// Create a rectangle
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at the origin with the given size
    pub const fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Size as `(width, height)`
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Position as `(x, y)`
    pub const fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Whether the rectangle covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
