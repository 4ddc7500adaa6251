//! Render configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Color, CoreError, CoreResult, ErrorCorrection, ModuleStyle};

/// Default output size in pixels.
pub const DEFAULT_PIXEL_SIZE: u32 = 180;

/// Where a logo image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum LogoSource {
    /// Image file on disk.
    Path(PathBuf),
    /// `data:` URI, base64 or percent-encoded.
    DataUri(String),
    /// Raw encoded image bytes.
    Bytes(Vec<u8>),
}

impl LogoSource {
    /// Short description for log lines; never includes payload bytes.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::DataUri(uri) => {
                let header = uri.split(',').next().unwrap_or_default();
                format!("{header},…")
            }
            Self::Bytes(bytes) => format!("{} bytes", bytes.len()),
        }
    }
}

/// Visual configuration for one rendered symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Output width and height in pixels.
    pub target_pixel_size: u32,
    /// Shape for non-finder dark modules.
    pub style: ModuleStyle,
    /// Fill for dark modules.
    pub dark_color: Color,
    /// Background fill and logo plate color.
    pub light_color: Color,
    /// Error-correction level requested from the encoder.
    pub error_correction: ErrorCorrection,
    /// Optional centered logo.
    pub logo: Option<LogoSource>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_pixel_size: DEFAULT_PIXEL_SIZE,
            style: ModuleStyle::default(),
            dark_color: Color::BLACK,
            light_color: Color::WHITE,
            error_correction: ErrorCorrection::default(),
            logo: None,
        }
    }
}

impl RenderConfig {
    /// Config with the given size and style, defaults elsewhere.
    #[must_use]
    pub fn new(target_pixel_size: u32, style: ModuleStyle) -> Self {
        Self {
            target_pixel_size,
            style,
            ..Self::default()
        }
    }

    /// Set the logo source.
    #[must_use]
    pub fn with_logo(mut self, logo: LogoSource) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Set dark and light colors.
    #[must_use]
    pub fn with_colors(mut self, dark: Color, light: Color) -> Self {
        self.dark_color = dark;
        self.light_color = light;
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel size is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.target_pixel_size == 0 {
            return Err(CoreError::InvalidConfig(
                "targetPixelSize must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded render config");
        Self::from_json(&json)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Serialization)
    }
}
