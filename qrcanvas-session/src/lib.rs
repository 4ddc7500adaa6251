//! # qrcanvas Session
//!
//! Asynchronous rendering sessions for styled QR symbols.
//!
//! A [`RenderSession`] owns one symbol being edited. Payload changes go through
//! the [`RegenerationController`], which encodes on a [`Scheduler`] and only ever
//! displays the matrix of the last payload submitted. Logos are decoded in the
//! background behind scoped [`LogoHandle`]s, released on replace or close.
//!
//! ```text
//! set_payload ──▶ controller ──spawn──▶ MatrixProvider ──▶ apply if latest ─┐
//!                                                                           ├─▶ draw()
//! select_logo ──▶ LogoStore ───spawn──▶ decode logo ─────▶ apply if latest ─┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod controller;
pub mod error;
pub mod logo_store;
pub mod provider;
pub mod scheduler;
pub mod session;

pub use cli::Cli;
pub use controller::{
    Completion, ControllerState, GenerationId, RegenerationController, RenderStatus,
};
pub use error::{SessionError, SessionResult};
pub use logo_store::{LogoHandle, LogoId, LogoStore, StoreStats};
pub use provider::{EncoderProvider, MatrixProvider};
pub use scheduler::{run_blocking, BlockingJob, ManualScheduler, Scheduler, Task, TokioScheduler};
pub use session::{LogoStatus, RenderSession};
