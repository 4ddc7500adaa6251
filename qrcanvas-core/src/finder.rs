//! Finder pattern classification.
//!
//! The three 7×7 corner squares are what scanners lock onto, so they are
//! excluded from module styling.

use serde::{Deserialize, Serialize};

/// Side length of a finder block in modules.
pub const FINDER_SIZE: usize = 7;

/// Which corner finder block a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderCorner {
    /// Block at (0, 0).
    TopLeft,
    /// Block at (N-7, 0).
    TopRight,
    /// Block at (0, N-7).
    BottomLeft,
}

/// Classify module `(x, y)` of an `size`×`size` matrix.
#[must_use]
pub fn classify(x: usize, y: usize, size: usize) -> Option<FinderCorner> {
    if x >= size || y >= size {
        return None;
    }
    let far = size.saturating_sub(FINDER_SIZE);
    let near_x = x < FINDER_SIZE;
    let near_y = y < FINDER_SIZE;

    if near_x && near_y {
        Some(FinderCorner::TopLeft)
    } else if x >= far && near_y {
        Some(FinderCorner::TopRight)
    } else if near_x && y >= far {
        Some(FinderCorner::BottomLeft)
    } else {
        None
    }
}

/// Whether module `(x, y)` lies inside any finder block.
#[must_use]
pub fn is_finder_module(x: usize, y: usize, size: usize) -> bool {
    classify(x, y, size).is_some()
}
