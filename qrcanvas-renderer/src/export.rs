//! Graphic export to image formats.
//!
//! Renders a [`QrGraphic`] to SVG directly, and to PNG or JPEG by rasterizing
//! the SVG through the resvg/tiny-skia pipeline (feature `export`).

use std::fmt::Write;

use qrcanvas_core::Color;

use crate::error::{RenderError, RenderResult};
use crate::graphic::QrGraphic;
use crate::logo::LogoLayer;
use crate::primitive::{Point, Shape};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// SVG vector graphics (returns the SVG XML string as UTF-8 bytes).
    Svg,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ExportFormat {
    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Guess a format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Configuration for raster export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Raster scale factor (e.g. 2.0 for retina). SVG output is unscaled.
    pub scale: f32,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            jpeg_quality: 85,
        }
    }
}

/// Exports a [`QrGraphic`] to SVG and raster formats.
pub struct GraphicExporter {
    config: ExportConfig,
}

impl GraphicExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export a graphic to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the graphic cannot be rasterized or encoded.
    pub fn export(&self, graphic: &QrGraphic, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Svg => Ok(render_to_svg(graphic).into_bytes()),
            ExportFormat::Png => self.render_to_png(graphic),
            ExportFormat::Jpeg => self.render_to_jpeg(graphic),
        }
    }

    /// Export the graphic to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "export")]
    pub fn render_to_png(&self, graphic: &QrGraphic) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(graphic)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the graphic to PNG bytes.
    ///
    /// # Errors
    ///
    /// Always fails without the `export` feature.
    #[cfg(not(feature = "export"))]
    pub fn render_to_png(&self, _graphic: &QrGraphic) -> RenderResult<Vec<u8>> {
        Err(RenderError::Unsupported("png"))
    }

    /// Export the graphic to JPEG bytes, flattened onto the background color.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, graphic: &QrGraphic) -> RenderResult<Vec<u8>> {
        use image::ImageEncoder;

        let pixmap = self.rasterize(graphic)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = graphic.background.opaque();
        let mut rgb_data = Vec::with_capacity(rgb_capacity(width, height));
        for pixel in pixmap.data().chunks_exact(4) {
            // tiny-skia stores premultiplied alpha.
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            rgb_data.push(f32::from(bg.r).mul_add(inv, f32::from(pixel[0])) as u8);
            rgb_data.push(f32::from(bg.g).mul_add(inv, f32::from(pixel[1])) as u8);
            rgb_data.push(f32::from(bg.b).mul_add(inv, f32::from(pixel[2])) as u8);
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Export the graphic to JPEG bytes.
    ///
    /// # Errors
    ///
    /// Always fails without the `export` feature.
    #[cfg(not(feature = "export"))]
    pub fn render_to_jpeg(&self, _graphic: &QrGraphic) -> RenderResult<Vec<u8>> {
        Err(RenderError::Unsupported("jpeg"))
    }

    /// Rasterize the graphic's SVG to a tiny-skia Pixmap at the configured scale.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn rasterize(&self, graphic: &QrGraphic) -> RenderResult<tiny_skia::Pixmap> {
        let svg_string = render_to_svg(graphic);
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(&svg_string, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let scale = self.config.scale.max(0.01);
        let px = (graphic.size as f32 * scale).round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px.max(1), px.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        Ok(pixmap)
    }
}

/// Render a graphic to an SVG document sized exactly to the graphic.
#[must_use]
pub fn render_to_svg(graphic: &QrGraphic) -> String {
    let size = graphic.size;
    let mut svg = String::with_capacity(64 * graphic.modules.len() + 512);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">",
    );

    // Background
    let _ = write!(
        svg,
        "<rect width=\"{size}\" height=\"{size}\"{}/>",
        fill_attrs(graphic.background)
    );

    // Modules
    let _ = write!(svg, "<g{}>", fill_attrs(graphic.foreground));
    for module in &graphic.modules {
        render_shape_svg(&mut svg, &module.shape);
    }
    svg.push_str("</g>");

    // Logo
    if let Some(logo) = &graphic.logo {
        render_logo_svg(&mut svg, logo);
    }

    svg.push_str("</svg>");
    svg
}

/// Render a single module primitive.
fn render_shape_svg(svg: &mut String, shape: &Shape) {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
        } => {
            let _ = write!(
                svg,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\""
            );
            if *corner_radius > 0.0 {
                let _ = write!(svg, " rx=\"{corner_radius}\" ry=\"{corner_radius}\"");
            }
            svg.push_str("/>");
        }
        Shape::Circle { cx, cy, r } => {
            let _ = write!(svg, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\"/>");
        }
        Shape::Rhombus { points } => render_polygon_svg(svg, points),
        Shape::Triangle { points } => render_polygon_svg(svg, points),
    }
}

fn render_polygon_svg(svg: &mut String, points: &[Point]) {
    svg.push_str("<polygon points=\"");
    for (idx, point) in points.iter().enumerate() {
        if idx > 0 {
            svg.push(' ');
        }
        let _ = write!(svg, "{},{}", point.x, point.y);
    }
    svg.push_str("\"/>");
}

/// Render the logo group: backing plate, then the image.
fn render_logo_svg(svg: &mut String, logo: &LogoLayer) {
    let layout = &logo.layout;
    svg.push_str("<g class=\"logo\">");
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\"{}/>",
        layout.plate_x,
        layout.plate_y,
        layout.plate_size,
        layout.plate_size,
        layout.plate_radius,
        layout.plate_radius,
        fill_attrs(logo.plate_color),
    );
    let _ = write!(
        svg,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" href=\"{}\"/>",
        layout.logo_x,
        layout.logo_y,
        layout.logo_size,
        layout.logo_size,
        logo.image.data_uri(),
    );
    svg.push_str("</g>");
}

/// ` fill="#rrggbb"` plus ` fill-opacity` when translucent.
fn fill_attrs(color: Color) -> String {
    if color.is_opaque() {
        format!(" fill=\"{}\"", color.to_hex_rgb())
    } else {
        format!(
            " fill=\"{}\" fill-opacity=\"{}\"",
            color.to_hex_rgb(),
            color.opacity()
        )
    }
}

/// Byte length of an RGB8 buffer, computed without `u32` overflow.
#[cfg_attr(not(feature = "export"), allow(dead_code))]
fn rgb_capacity(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}
