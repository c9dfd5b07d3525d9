//! Bounding box annotation types.

use serde::{Deserialize, Serialize};

/// A pixel-space, axis-aligned bounding box tagged with a class index.
///
/// Coordinates are stored exactly as drawn: they are not clamped to the image
/// bounds and may be negative. `class_index` is positional into the global
/// class list at the time the box is read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Index into the class registry
    #[serde(rename = "classIndex", default)]
    pub class_index: u32,
    /// Top-left X in pixels
    pub x: f64,
    /// Top-left Y in pixels
    pub y: f64,
    /// Width in pixels
    pub w: f64,
    /// Height in pixels
    pub h: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its top-left corner and size.
    pub fn new(class_index: u32, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            class_index,
            x,
            y,
            w,
            h,
        }
    }

    /// Center point of the box in pixels.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether every component is within `eps` of `other`'s (class index must match).
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.class_index == other.class_index
            && (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.w - other.w).abs() <= eps
            && (self.h - other.h).abs() <= eps
    }
}
