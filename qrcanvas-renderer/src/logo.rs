//! Logo loading and badge layout.
//!
//! Logos arrive as raw bytes, files, or `data:` URIs. They are decoded once,
//! downscaled if oversized, and re-encoded to PNG so the badge can be embedded
//! in the SVG as a self-contained data URI.

use std::io::Cursor;

use base64::Engine;
use qrcanvas_core::{Color, LogoLoadError, LogoSource};

/// Logo side length as a fraction of the canvas.
pub const LOGO_FRACTION: f32 = 0.2;

/// Plate padding beyond the logo bounds, in pixels.
pub const PLATE_PADDING: f32 = 6.0;

/// Plate corner radius, in pixels.
pub const PLATE_CORNER_RADIUS: f32 = 8.0;

/// Logos larger than this on either side are downscaled before embedding.
pub const MAX_LOGO_DIMENSION: u32 = 512;

/// Encoded image formats accepted for logos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// WebP.
    WebP,
    /// GIF (first frame).
    Gif,
}

impl LogoFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        if data.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }
        None
    }
}

/// A decoded logo, normalized to PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    /// Width in pixels after normalization.
    pub width: u32,
    /// Height in pixels after normalization.
    pub height: u32,
    /// Format the logo was supplied in.
    pub source_format: LogoFormat,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

impl LogoImage {
    /// `data:image/png;base64,...` URI for embedding.
    #[must_use]
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.png);
        format!("data:image/png;base64,{encoded}")
    }
}

/// Decode logo bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image or fail to decode.
pub fn decode_logo(data: &[u8]) -> Result<LogoImage, LogoLoadError> {
    let source_format = LogoFormat::from_magic_bytes(data).ok_or(LogoLoadError::UnknownFormat)?;

    let mut img = image::load_from_memory(data)
        .map_err(|e| LogoLoadError::Decode(e.to_string()))?;

    if img.width() > MAX_LOGO_DIMENSION || img.height() > MAX_LOGO_DIMENSION {
        tracing::debug!(
            width = img.width(),
            height = img.height(),
            "Downscaling oversized logo"
        );
        img = img.resize(
            MAX_LOGO_DIMENSION,
            MAX_LOGO_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| LogoLoadError::Decode(format!("PNG re-encode failed: {e}")))?;

    Ok(LogoImage {
        width: img.width(),
        height: img.height(),
        source_format,
        png: png.into_inner(),
    })
}

/// Load and decode a logo from any supported source.
///
/// Reads from disk for [`LogoSource::Path`], so call from a blocking context.
///
/// # Errors
///
/// Returns an error if the source cannot be read or decoded.
pub fn load_logo(source: &LogoSource) -> Result<LogoImage, LogoLoadError> {
    match source {
        LogoSource::Path(path) => decode_logo(&std::fs::read(path)?),
        LogoSource::DataUri(uri) => decode_logo(&parse_data_uri(uri)?),
        LogoSource::Bytes(bytes) => decode_logo(bytes),
    }
}

/// Extract the payload bytes of a `data:` URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the URI is malformed.
pub fn parse_data_uri(uri: &str) -> Result<Vec<u8>, LogoLoadError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| LogoLoadError::InvalidDataUri("missing data: prefix".to_string()))?;

    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| LogoLoadError::InvalidDataUri("missing comma".to_string()))?;

    if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| LogoLoadError::InvalidDataUri(format!("bad base64: {e}")))
    } else {
        percent_decode(encoded)
    }
}

fn percent_decode(input: &str) -> Result<Vec<u8>, LogoLoadError> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| LogoLoadError::InvalidDataUri("bad percent escape".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Placement of the logo badge and its backing plate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoLayout {
    /// Logo left edge.
    pub logo_x: f32,
    /// Logo top edge.
    pub logo_y: f32,
    /// Logo side length.
    pub logo_size: f32,
    /// Plate left edge.
    pub plate_x: f32,
    /// Plate top edge.
    pub plate_y: f32,
    /// Plate side length.
    pub plate_size: f32,
    /// Plate corner radius.
    pub plate_radius: f32,
}

impl LogoLayout {
    /// Centered layout for a square canvas of `canvas_size` pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_canvas(canvas_size: u32) -> Self {
        let canvas = canvas_size as f32;
        let logo_size = canvas * LOGO_FRACTION;
        let logo_x = (canvas - logo_size) / 2.0;
        let plate_size = logo_size + PLATE_PADDING * 2.0;
        let plate_x = logo_x - PLATE_PADDING;

        Self {
            logo_x,
            logo_y: logo_x,
            logo_size,
            plate_x,
            plate_y: plate_x,
            plate_size,
            plate_radius: PLATE_CORNER_RADIUS,
        }
    }

    /// Center point of the badge.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        let half = self.logo_size / 2.0;
        (self.logo_x + half, self.logo_y + half)
    }
}

/// The composited logo group: plate then image.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoLayer {
    /// Geometry of plate and image.
    pub layout: LogoLayout,
    /// Opaque plate fill.
    pub plate_color: Color,
    /// Decoded image.
    pub image: std::sync::Arc<LogoImage>,
}

impl LogoLayer {
    /// Lay out `image` on a canvas, with a plate in the (opaque) light color.
    #[must_use]
    pub fn new(image: std::sync::Arc<LogoImage>, canvas_size: u32, light: Color) -> Self {
        Self {
            layout: LogoLayout::for_canvas(canvas_size),
            plate_color: light.opaque(),
            image,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    /// 1x1 red PNG.
    pub const RED_PIXEL_PNG_BASE64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    pub fn red_pixel_png() -> Vec<u8> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(RED_PIXEL_PNG_BASE64)
            .expect("valid base64")
    }
}
