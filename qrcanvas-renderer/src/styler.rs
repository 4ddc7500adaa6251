//! Style renderer: maps dark modules to primitives.
//!
//! Finder-block modules always become plain squares; every other dark module
//! takes the configured [`ModuleStyle`]. Light modules emit nothing.

use qrcanvas_core::{is_finder_module, ModuleStyle, RenderConfig, SymbolMatrix};

use crate::primitive::{ModuleShape, Point, Shape};

/// Corner radius of a rounded module, as a fraction of module size.
pub const ROUNDED_CORNER_RATIO: f32 = 0.3;

/// Dot radius, as a fraction of module size.
pub const DOT_RADIUS_RATIO: f32 = 0.4;

/// Pixel side length of one module for a matrix drawn at `target_pixel_size`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn module_size(target_pixel_size: u32, matrix_size: usize) -> f32 {
    target_pixel_size as f32 / matrix_size.max(1) as f32
}

/// Produce one primitive per dark module, in row-major order.
///
/// Single pass over the grid; the matrix is only read.
#[must_use]
pub fn style_modules(matrix: &SymbolMatrix, config: &RenderConfig) -> Vec<ModuleShape> {
    let n = matrix.size();
    let m = module_size(config.target_pixel_size, n);
    let mut shapes = Vec::with_capacity(matrix.dark_count());

    for (column, row, dark) in matrix.modules() {
        if !dark {
            continue;
        }
        let finder = is_finder_module(column, row, n);
        let style = if finder {
            ModuleStyle::Square
        } else {
            config.style
        };
        shapes.push(ModuleShape {
            column,
            row,
            finder,
            shape: module_shape(style, column, row, m),
        });
    }

    tracing::trace!(
        size = n,
        style = %config.style,
        primitives = shapes.len(),
        "Styled modules"
    );
    shapes
}

/// Geometry of a single module cell in the given style.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn module_shape(style: ModuleStyle, column: usize, row: usize, m: f32) -> Shape {
    let x = column as f32 * m;
    let y = row as f32 * m;
    let half = m / 2.0;

    match style {
        ModuleStyle::Square => Shape::Rect {
            x,
            y,
            width: m,
            height: m,
            corner_radius: 0.0,
        },
        ModuleStyle::Rounded => Shape::Rect {
            x,
            y,
            width: m,
            height: m,
            corner_radius: m * ROUNDED_CORNER_RATIO,
        },
        ModuleStyle::Dot => Shape::Circle {
            cx: x + half,
            cy: y + half,
            r: m * DOT_RADIUS_RATIO,
        },
        ModuleStyle::Diamond => Shape::Rhombus {
            points: [
                Point::new(x + half, y),
                Point::new(x + m, y + half),
                Point::new(x + half, y + m),
                Point::new(x, y + half),
            ],
        },
        ModuleStyle::Triangle => Shape::Triangle {
            points: [
                Point::new(x, y),
                Point::new(x + m, y),
                Point::new(x + half, y + m),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(size: usize) -> SymbolMatrix {
        let modules = (0..size * size).map(|i| (i / size + i % size) % 2 == 0).collect();
        SymbolMatrix::from_modules(size, modules).expect("matrix")
    }

    #[test]
    fn test_light_modules_emit_nothing() {
        let matrix = SymbolMatrix::from_modules(21, vec![false; 441]).expect("matrix");
        let shapes = style_modules(&matrix, &RenderConfig::default());
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_one_primitive_per_dark_module() {
        let matrix = checker(25);
        for style in ModuleStyle::ALL {
            let shapes = style_modules(&matrix, &RenderConfig::new(250, style));
            assert_eq!(shapes.len(), matrix.dark_count(), "style {style}");
        }
    }

    #[test]
    fn test_square_fills_cell() {
        let shape = module_shape(ModuleStyle::Square, 2, 3, 10.0);
        assert_eq!(
            shape,
            Shape::Rect {
                x: 20.0,
                y: 30.0,
                width: 10.0,
                height: 10.0,
                corner_radius: 0.0,
            }
        );
        assert!(shape.is_plain_square());
    }

    #[test]
    fn test_rounded_radius() {
        match module_shape(ModuleStyle::Rounded, 0, 0, 10.0) {
            Shape::Rect { corner_radius, .. } => assert!((corner_radius - 3.0).abs() < 1e-5),
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_dot_centered() {
        assert_eq!(
            module_shape(ModuleStyle::Dot, 1, 1, 10.0),
            Shape::Circle {
                cx: 15.0,
                cy: 15.0,
                r: 4.0,
            }
        );
    }

    #[test]
    fn test_diamond_touches_edge_midpoints() {
        let shape = module_shape(ModuleStyle::Diamond, 0, 0, 8.0);
        assert_eq!(
            shape.vertices(),
            &[
                Point::new(4.0, 0.0),
                Point::new(8.0, 4.0),
                Point::new(4.0, 8.0),
                Point::new(0.0, 4.0),
            ]
        );
    }

    #[test]
    fn test_triangle_points_down() {
        let shape = module_shape(ModuleStyle::Triangle, 1, 0, 8.0);
        let points = shape.vertices();
        assert_eq!(points.len(), 3);
        // Apex at the bottom center, base along the top edge.
        assert_eq!(points[2], Point::new(12.0, 8.0));
        assert!((points[0].y - points[1].y).abs() < f32::EPSILON);
        assert!(points[2].y > points[0].y);
    }

    #[test]
    fn test_finder_modules_forced_square() {
        let matrix = SymbolMatrix::from_modules(21, vec![true; 441]).expect("matrix");
        let shapes = style_modules(&matrix, &RenderConfig::new(210, ModuleStyle::Dot));

        let finder: Vec<_> = shapes.iter().filter(|s| s.finder).collect();
        assert_eq!(finder.len(), 147);
        assert!(finder.iter().all(|s| s.shape.is_plain_square()));
        assert!(shapes
            .iter()
            .filter(|s| !s.finder)
            .all(|s| matches!(s.shape, Shape::Circle { .. })));
    }

    #[test]
    fn test_matrix_not_mutated() {
        let matrix = checker(21);
        let before = matrix.clone();
        let _ = style_modules(&matrix, &RenderConfig::new(100, ModuleStyle::Triangle));
        assert_eq!(matrix, before);
    }
}
