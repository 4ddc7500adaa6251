//! Renderer error types.

use qrcanvas_core::CoreError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The render config failed validation.
    #[error("Invalid render config: {0}")]
    Config(#[from] CoreError),

    /// Encoding the graphic to an output format failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The requested format needs the `export` feature.
    #[error("Export format {0} requires the `export` feature")]
    Unsupported(&'static str),
}
