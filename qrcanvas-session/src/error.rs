//! Session error types.

use qrcanvas_core::CoreError;
use qrcanvas_renderer::RenderError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by a rendering session.
///
/// Encoding failures are not errors here: they are a controller state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No async runtime is available to schedule work on.
    #[error("No runtime available for scheduling: {0}")]
    NoRuntime(String),

    /// The session was closed.
    #[error("Session is closed")]
    Closed,

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] CoreError),

    /// Composition or export failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}
