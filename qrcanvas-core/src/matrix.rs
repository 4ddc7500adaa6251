//! The symbol matrix: an immutable square grid of dark/light modules.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// An N×N grid of modules produced by a symbol encoder.
///
/// Modules are stored row-major. There is no mutable access after
/// construction; styling never alters the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix", into = "RawMatrix")]
pub struct SymbolMatrix {
    size: usize,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    /// Build a matrix from row-major modules.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero or `modules.len() != size * size`.
    pub fn from_modules(size: usize, modules: Vec<bool>) -> CoreResult<Self> {
        if size == 0 {
            return Err(CoreError::InvalidMatrix("size must be non-zero".to_string()));
        }
        let expected = size
            .checked_mul(size)
            .ok_or_else(|| CoreError::InvalidMatrix(format!("size {size} overflows")))?;
        if modules.len() != expected {
            return Err(CoreError::InvalidMatrix(format!(
                "expected {expected} modules for size {size}, got {}",
                modules.len()
            )));
        }
        Ok(Self { size, modules })
    }

    /// Build a matrix from rows, rejecting ragged or non-square input.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not form a non-empty square.
    pub fn from_rows(rows: &[Vec<bool>]) -> CoreResult<Self> {
        let size = rows.len();
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(CoreError::InvalidMatrix(format!(
                "row {y} has {} modules, expected {size}",
                row.len()
            )));
        }
        Self::from_modules(size, rows.concat())
    }

    /// Side length in modules.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the module at column `x`, row `y` is dark.
    ///
    /// Out-of-bounds coordinates read as light.
    #[must_use]
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    /// Iterate all modules as `(x, y, dark)` in row-major order.
    pub fn modules(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.modules
            .iter()
            .enumerate()
            .map(move |(i, &dark)| (i % self.size, i / self.size, dark))
    }

    /// Number of dark modules.
    #[must_use]
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&dark| dark).count()
    }
}

#[derive(Serialize, Deserialize)]
struct RawMatrix {
    size: usize,
    modules: Vec<bool>,
}

impl TryFrom<RawMatrix> for SymbolMatrix {
    type Error = CoreError;

    fn try_from(raw: RawMatrix) -> CoreResult<Self> {
        Self::from_modules(raw.size, raw.modules)
    }
}

impl From<SymbolMatrix> for RawMatrix {
    fn from(matrix: SymbolMatrix) -> Self {
        Self {
            size: matrix.size,
            modules: matrix.modules,
        }
    }
}
