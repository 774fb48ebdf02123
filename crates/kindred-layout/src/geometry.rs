use serde::{Deserialize, Serialize};

/// 2D point with f32 coordinates, in final screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Min/max bound of the layout along the breadth (screen y) axis
///
/// The rendering layer uses this to center the tree in the viewport or
/// to clamp scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f32,
    pub max: f32,
}

impl Extent {
    /// An empty extent anchored at zero
    pub fn zero() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    /// Grow the extent to include `value`
    pub fn include(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Total covered span
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}
