use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in UV space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct UvRect {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl UvRect {
    /// The full `(0, 0, 1, 1)` unit square.
    pub const UNIT: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Construct a rect from its origin and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest U coordinate.
    #[must_use]
    pub fn xmin(&self) -> f32 {
        self.x
    }

    /// Largest U coordinate.
    #[must_use]
    pub fn xmax(&self) -> f32 {
        self.x + self.width
    }

    /// Smallest V coordinate.
    #[must_use]
    pub fn ymin(&self) -> f32 {
        self.y
    }

    /// Largest V coordinate.
    #[must_use]
    pub fn ymax(&self) -> f32 {
        self.y + self.height
    }

    /// Map normalized `(s, t)` in `[0, 1]²` into this rect.
    #[must_use]
    pub fn lerp(&self, s: f32, t: f32) -> glam::Vec2 {
        glam::Vec2::new(self.x + self.width * s, self.y + self.height * t)
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::UNIT
    }
}
