//! # qrcanvas Core
//!
//! Core types for the styled QR rendering engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                qrcanvas-core                │
//! ├─────────────────────────────────────────────┤
//! │  Symbol Matrix   │  Render Config           │
//! │  - N×N modules   │  - Pixel size            │
//! │  - Immutable     │  - Module style          │
//! │                  │  - Colors, logo source   │
//! ├─────────────────────────────────────────────┤
//! │  Finder Classifier │  Encoder seam          │
//! │  - 7×7 corners     │  - qrcode-backed       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod config;
pub mod encoder;
pub mod error;
pub mod finder;
pub mod matrix;
pub mod style;

pub use color::Color;
pub use config::{LogoSource, RenderConfig};
pub use encoder::{ErrorCorrection, QrcodeEncoder, SymbolEncoder};
pub use error::{CoreError, CoreResult, EncodingError, LogoLoadError};
pub use finder::{classify, is_finder_module, FinderCorner, FINDER_SIZE};
pub use matrix::SymbolMatrix;
pub use style::ModuleStyle;

/// qrcanvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
