//! Image dimension probing.
//!
//! The interchange engine never decodes pixels; it only needs the width and
//! height of an image to normalize or denormalize box coordinates.

use std::io::Cursor;

/// Error type for probe operations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{probe}] {message}")]
pub struct ProbeError {
    /// Human-readable error message.
    pub message: String,
    /// The probe that produced this error.
    pub probe: &'static str,
}

impl ProbeError {
    /// Create a new probe error.
    pub fn new(probe: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            probe,
        }
    }
}

/// Pixel dimensions of an image. Zero in either axis means "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Dimensions used when probing fails.
    pub const UNKNOWN: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create new dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both axes are non-zero and may be used as denominators.
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Capability of reading the pixel size of encoded image bytes.
///
/// Implementations must report malformed input as `Err`, never panic.
pub trait ImageProbe: Send + Sync {
    /// Unique identifier used in log and error messages.
    fn id(&self) -> &'static str;

    /// Read the dimensions of an encoded image.
    fn dimensions(&self, data: &[u8]) -> Result<Dimensions, ProbeError>;

    /// Read the dimensions, absorbing failure into [`Dimensions::UNKNOWN`].
    fn dimensions_or_unknown(&self, data: &[u8], name: &str) -> Dimensions {
        match self.dimensions(data) {
            Ok(dims) => dims,
            Err(e) => {
                log::debug!("Could not probe dimensions of '{}': {}", name, e);
                Dimensions::UNKNOWN
            }
        }
    }
}

/// Probe backed by the `image` crate's header readers.
///
/// Supports PNG, JPEG, BMP and WebP. Only the header is parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderProbe;

impl ImageProbe for HeaderProbe {
    fn id(&self) -> &'static str {
        "header"
    }

    fn dimensions(&self, data: &[u8]) -> Result<Dimensions, ProbeError> {
        let reader = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProbeError::new(self.id(), format!("Failed to sniff format: {}", e)))?;

        if reader.format().is_none() {
            return Err(ProbeError::new(self.id(), "Unrecognized image format"));
        }

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ProbeError::new(self.id(), format!("Failed to read header: {}", e)))?;
        Ok(Dimensions::new(width, height))
    }
}
