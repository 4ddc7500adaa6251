//! Symbol encoding seam.
//!
//! Turning a payload into an error-corrected module grid is delegated to an
//! encoder behind [`SymbolEncoder`]. [`QrcodeEncoder`] is the default
//! implementation, backed by the `qrcode` crate.

use std::fmt;
use std::str::FromStr;

use qrcode::types::QrError;
use serde::{Deserialize, Serialize};

use crate::{CoreError, EncodingError, SymbolMatrix};

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    /// ~7% recovery.
    Low,
    /// ~15% recovery.
    #[default]
    Medium,
    /// ~25% recovery.
    Quartile,
    /// ~30% recovery.
    High,
}

impl ErrorCorrection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Quartile => "quartile",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCorrection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l" | "low" => Ok(Self::Low),
            "m" | "medium" => Ok(Self::Medium),
            "q" | "quartile" => Ok(Self::Quartile),
            "h" | "high" => Ok(Self::High),
            _ => Err(CoreError::InvalidConfig(format!(
                "unknown error correction level: {s}"
            ))),
        }
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => Self::L,
            ErrorCorrection::Medium => Self::M,
            ErrorCorrection::Quartile => Self::Q,
            ErrorCorrection::High => Self::H,
        }
    }
}

/// Encodes payload text into a symbol matrix.
pub trait SymbolEncoder: Send + Sync {
    /// Encode `payload` at the given error-correction level.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::DataTooLong`] when the payload exceeds the
    /// symbol capacity at `level`.
    fn encode(&self, payload: &str, level: ErrorCorrection)
        -> Result<SymbolMatrix, EncodingError>;
}

/// [`SymbolEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

impl QrcodeEncoder {
    /// Create the encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SymbolEncoder for QrcodeEncoder {
    fn encode(
        &self,
        payload: &str,
        level: ErrorCorrection,
    ) -> Result<SymbolMatrix, EncodingError> {
        let code = qrcode::QrCode::with_error_correction_level(payload.as_bytes(), level.into())
            .map_err(|err| match err {
                QrError::DataTooLong => EncodingError::DataTooLong {
                    bytes: payload.len(),
                    level,
                },
                other => EncodingError::Rejected(other.to_string()),
            })?;

        let size = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();

        tracing::trace!(size, %level, "Encoded payload");
        SymbolMatrix::from_modules(size, modules)
            .map_err(|err| EncodingError::Rejected(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::is_finder_module;

    #[test]
    fn test_encode_version_1() {
        let matrix = QrcodeEncoder::new()
            .encode("HELLO WORLD", ErrorCorrection::Low)
            .expect("fits in version 1");
        assert_eq!(matrix.size(), 21);
    }

    #[test]
    fn test_finder_corners_are_dark_ringed() {
        let matrix = QrcodeEncoder::new()
            .encode("https://example.com", ErrorCorrection::Medium)
            .expect("encode");
        let n = matrix.size();
        // Outer ring of each finder block is dark.
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(n - 1, 0));
        assert!(matrix.is_dark(0, n - 1));
        // Separator row just outside the top-left block is light.
        assert!(!matrix.is_dark(7, 0));
        assert!(is_finder_module(n - 7, 0, n));
    }

    #[test]
    fn test_capacity_depends_on_level() {
        let payload = "a".repeat(1500);
        let encoder = QrcodeEncoder::new();
        assert!(encoder.encode(&payload, ErrorCorrection::Low).is_ok());
        assert_eq!(
            encoder.encode(&payload, ErrorCorrection::High),
            Err(EncodingError::DataTooLong {
                bytes: 1500,
                level: ErrorCorrection::High,
            })
        );
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("H".parse::<ErrorCorrection>().ok(), Some(ErrorCorrection::High));
        assert_eq!(
            "quartile".parse::<ErrorCorrection>().ok(),
            Some(ErrorCorrection::Quartile)
        );
        assert!("x".parse::<ErrorCorrection>().is_err());
    }
}
