//! Error types for qrcanvas.
//!
//! Encoding and logo failures are separate types: the former is surfaced to the
//! caller as a failure state, the latter is absorbed and degrades to "no logo".

use thiserror::Error;

use crate::encoder::ErrorCorrection;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors from core model construction and parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The module grid is not square or is empty.
    #[error("Invalid symbol matrix: {0}")]
    InvalidMatrix(String),

    /// A render configuration value is out of range.
    #[error("Invalid render config: {0}")]
    InvalidConfig(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A style name is not one of the known module styles.
    #[error("Unknown module style: {0}")]
    UnknownStyle(String),

    /// Config serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The encoder rejected a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Payload exceeds the symbol capacity at the requested level.
    #[error("Payload of {bytes} bytes exceeds QR capacity at {level} error correction")]
    DataTooLong {
        /// Payload length in bytes.
        bytes: usize,
        /// Requested error-correction level.
        level: ErrorCorrection,
    },

    /// Payload is invalid for the encoder for another reason.
    #[error("Payload rejected by encoder: {0}")]
    Rejected(String),
}

/// A logo image could not be loaded or decoded.
#[derive(Debug, Error)]
pub enum LogoLoadError {
    /// The bytes do not match any supported image signature.
    #[error("Unrecognized logo image format")]
    UnknownFormat,

    /// The image decoder failed.
    #[error("Failed to decode logo: {0}")]
    Decode(String),

    /// A `data:` URI was malformed.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Reading the logo file failed.
    #[error("Failed to read logo: {0}")]
    Io(#[from] std::io::Error),
}
