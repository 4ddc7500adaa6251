//! The composed, layered QR graphic.

use std::sync::Arc;

use qrcanvas_core::{Color, RenderConfig, SymbolMatrix};

use crate::error::RenderResult;
use crate::logo::{LogoImage, LogoLayer};
use crate::primitive::ModuleShape;
use crate::styler::{module_size, style_modules};

/// A styled QR code as ordered layers: background, modules, optional logo.
#[derive(Debug, Clone, PartialEq)]
pub struct QrGraphic {
    /// Width and height in pixels.
    pub size: u32,
    /// Module count per side of the source matrix.
    pub matrix_size: usize,
    /// Background fill.
    pub background: Color,
    /// Fill shared by every module primitive.
    pub foreground: Color,
    /// One primitive per dark module, row-major.
    pub modules: Vec<ModuleShape>,
    /// Logo group drawn last, if a logo was supplied.
    pub logo: Option<LogoLayer>,
}

impl QrGraphic {
    /// Pixel side length of one module.
    #[must_use]
    pub fn module_size(&self) -> f32 {
        module_size(self.size, self.matrix_size)
    }

    /// Primitives for finder-block modules.
    pub fn finder_modules(&self) -> impl Iterator<Item = &ModuleShape> {
        self.modules.iter().filter(|m| m.finder)
    }

    /// Primitives for styled (non-finder) modules.
    pub fn data_modules(&self) -> impl Iterator<Item = &ModuleShape> {
        self.modules.iter().filter(|m| !m.finder)
    }
}

/// Compose a graphic from a matrix, a config and an already-decoded logo.
///
/// Pure: identical inputs give identical graphics. The logo source in
/// `config` is ignored here; decoding happens upstream.
///
/// # Errors
///
/// Returns an error if the config fails validation.
pub fn compose(
    matrix: &SymbolMatrix,
    config: &RenderConfig,
    logo: Option<Arc<LogoImage>>,
) -> RenderResult<QrGraphic> {
    config.validate()?;

    let modules = style_modules(matrix, config);
    let logo = logo.map(|image| LogoLayer::new(image, config.target_pixel_size, config.light_color));

    Ok(QrGraphic {
        size: config.target_pixel_size,
        matrix_size: matrix.size(),
        background: config.light_color,
        foreground: config.dark_color,
        modules,
        logo,
    })
}
