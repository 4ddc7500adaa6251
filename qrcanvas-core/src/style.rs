//! Module styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Shape drawn for each non-finder dark module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStyle {
    /// Full-cell square.
    #[default]
    Square,
    /// Centered circle, radius 40% of the module.
    Dot,
    /// Square with corner radius 30% of the module.
    Rounded,
    /// Rhombus through the cell's edge midpoints.
    Diamond,
    /// Downward-pointing triangle inscribed in the cell.
    Triangle,
}

impl ModuleStyle {
    /// Every style, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Square,
        Self::Dot,
        Self::Rounded,
        Self::Diamond,
        Self::Triangle,
    ];

    /// Lowercase name used in config files and the CLI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Dot => "dot",
            Self::Rounded => "rounded",
            Self::Diamond => "diamond",
            Self::Triangle => "triangle",
        }
    }
}

impl fmt::Display for ModuleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == lower)
            .ok_or_else(|| CoreError::UnknownStyle(s.to_string()))
    }
}
