//! Drawable primitives emitted by the style renderer.

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A filled geometric shape in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Axis-aligned rectangle, optionally with rounded corners.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Corner radius; zero for sharp corners.
        corner_radius: f32,
    },
    /// Circle.
    Circle {
        /// Center x.
        cx: f32,
        /// Center y.
        cy: f32,
        /// Radius.
        r: f32,
    },
    /// Four-point rhombus: top, right, bottom, left.
    Rhombus {
        /// Vertices in drawing order.
        points: [Point; 4],
    },
    /// Three-point triangle.
    Triangle {
        /// Vertices in drawing order.
        points: [Point; 3],
    },
}

impl Shape {
    /// Whether this is a sharp-cornered rectangle.
    #[must_use]
    pub fn is_plain_square(&self) -> bool {
        matches!(self, Self::Rect { corner_radius, width, height, .. }
            if corner_radius.abs() < f32::EPSILON && (width - height).abs() < f32::EPSILON)
    }

    /// Polygon vertices, or an empty slice for rects and circles.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        match self {
            Self::Rhombus { points } => points.as_slice(),
            Self::Triangle { points } => points.as_slice(),
            Self::Rect { .. } | Self::Circle { .. } => &[],
        }
    }
}

/// The primitive drawn for one dark module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleShape {
    /// Module column.
    pub column: usize,
    /// Module row.
    pub row: usize,
    /// True when the module lies in a finder block and was forced square.
    pub finder: bool,
    /// Geometry in pixel space.
    pub shape: Shape,
}
