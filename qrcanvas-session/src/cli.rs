//! Command-line arguments for the `qrcanvas` binary.

use std::path::PathBuf;

use clap::Parser;
use qrcanvas_core::{Color, CoreResult, ErrorCorrection, LogoSource, ModuleStyle, RenderConfig};
use qrcanvas_renderer::{ExportConfig, ExportFormat};

/// Command-line arguments for qrcanvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "qrcanvas")]
#[command(about = "Render a styled QR symbol to SVG, PNG or JPEG")]
#[command(version)]
pub struct Cli {
    /// Text to encode
    pub payload: String,

    /// Output file
    #[arg(short, long, env = "QRCANVAS_OUTPUT", default_value = "qrcode.svg")]
    pub output: PathBuf,

    /// JSON render config; flags override its values
    #[arg(short, long, env = "QRCANVAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Module style (square, dot, rounded, diamond, triangle)
    #[arg(short, long, env = "QRCANVAS_STYLE")]
    pub style: Option<ModuleStyle>,

    /// Output width and height in pixels
    #[arg(long, env = "QRCANVAS_SIZE")]
    pub size: Option<u32>,

    /// Dark module color (#rgb, #rrggbb or #rrggbbaa)
    #[arg(long, env = "QRCANVAS_DARK")]
    pub dark: Option<Color>,

    /// Background color
    #[arg(long, env = "QRCANVAS_LIGHT")]
    pub light: Option<Color>,

    /// Error-correction level (low, medium, quartile, high)
    #[arg(short, long, env = "QRCANVAS_ERROR_CORRECTION")]
    pub error_correction: Option<ErrorCorrection>,

    /// Logo image drawn at the center
    #[arg(long, env = "QRCANVAS_LOGO")]
    pub logo: Option<PathBuf>,

    /// Output format; inferred from the output extension if omitted
    #[arg(short, long, env = "QRCANVAS_FORMAT", value_parser = parse_format)]
    pub format: Option<ExportFormat>,

    /// Raster scale factor for PNG and JPEG
    #[arg(long, env = "QRCANVAS_SCALE", default_value_t = 1.0)]
    pub scale: f32,
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_extension(value)
        .ok_or_else(|| format!("unknown format '{value}', expected svg, png or jpeg"))
}

impl Cli {
    /// Build the render config: the `--config` file (or defaults) with flags on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the result is invalid.
    pub fn resolve_config(&self) -> CoreResult<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::from_file(path)?,
            None => RenderConfig::default(),
        };

        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(size) = self.size {
            config.target_pixel_size = size;
        }
        if let Some(dark) = self.dark {
            config.dark_color = dark;
        }
        if let Some(light) = self.light {
            config.light_color = light;
        }
        if let Some(level) = self.error_correction {
            config.error_correction = level;
        }
        if let Some(logo) = &self.logo {
            config.logo = Some(LogoSource::Path(logo.clone()));
        }

        config.validate()?;
        Ok(config)
    }

    /// Explicit `--format`, else the output file's extension.
    #[must_use]
    pub fn output_format(&self) -> Option<ExportFormat> {
        self.format.or_else(|| {
            self.output
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ExportFormat::from_extension)
        })
    }

    /// Raster export settings.
    #[must_use]
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            scale: self.scale,
            ..ExportConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("qrcanvas").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["hello"]);
        let config = cli.resolve_config().expect("valid");
        assert_eq!(config, RenderConfig::default());
        assert_eq!(cli.output_format(), Some(ExportFormat::Svg));
    }

    #[test]
    fn test_flags_parse_domain_types() {
        let cli = parse(&[
            "hello",
            "--style",
            "dot",
            "--size",
            "300",
            "--dark",
            "#336699",
            "--error-correction",
            "high",
        ]);
        let config = cli.resolve_config().expect("valid");
        assert_eq!(config.style, ModuleStyle::Dot);
        assert_eq!(config.target_pixel_size, 300);
        assert_eq!(config.dark_color, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(config.error_correction, ErrorCorrection::High);
    }

    #[test]
    fn test_unknown_style_rejected() {
        let result = Cli::try_parse_from(["qrcanvas", "hello", "--style", "hexagon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_from_extension_and_flag() {
        let cli = parse(&["hello", "-o", "out.JPG"]);
        assert_eq!(cli.output_format(), Some(ExportFormat::Jpeg));

        let cli = parse(&["hello", "-o", "out.bin", "--format", "png"]);
        assert_eq!(cli.output_format(), Some(ExportFormat::Png));

        let cli = parse(&["hello", "-o", "out.bin"]);
        assert_eq!(cli.output_format(), None);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r##"{{"targetPixelSize": 250, "style": "diamond", "lightColor": "#fafafa"}}"##
        )
        .expect("write config");

        let path = file.path().to_string_lossy().into_owned();
        let cli = parse(&["hello", "--config", &path, "--size", "120"]);
        let config = cli.resolve_config().expect("valid");
        assert_eq!(config.target_pixel_size, 120);
        assert_eq!(config.style, ModuleStyle::Diamond);
        assert_eq!(config.light_color, Color::rgb(0xfa, 0xfa, 0xfa));
    }

    #[test]
    fn test_logo_flag_becomes_path_source() {
        let cli = parse(&["hello", "--logo", "brand.png"]);
        let config = cli.resolve_config().expect("valid");
        assert_eq!(config.logo, Some(LogoSource::Path("brand.png".into())));
    }

    #[test]
    fn test_zero_size_rejected() {
        let cli = parse(&["hello", "--size", "0"]);
        assert!(cli.resolve_config().is_err());
    }
}
