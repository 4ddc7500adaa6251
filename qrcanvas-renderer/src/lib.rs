//! # qrcanvas Renderer
//!
//! Turns a [`SymbolMatrix`] and a [`RenderConfig`] into a layered vector graphic.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ SymbolMatrix │──▶│ Style renderer │──▶│ Logo composit │──▶│ SVG/PNG/JPEG │
//! │   (N×N)      │   │ finder → square│   │ plate + badge │   │   export     │
//! └──────────────┘   └────────────────┘   └───────────────┘   └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod graphic;
pub mod logo;
pub mod primitive;
pub mod styler;

pub use error::{RenderError, RenderResult};
pub use export::{render_to_svg, ExportConfig, ExportFormat, GraphicExporter};
pub use graphic::{compose, QrGraphic};
pub use logo::{decode_logo, load_logo, LogoImage, LogoLayer, LogoLayout};
pub use primitive::{ModuleShape, Point, Shape};
pub use styler::{module_shape, module_size, style_modules};
