//! YOLO label lines and coordinate conversion.
//!
//! Each line of a label file:
//! ```text
//! <class_index> <x_center> <y_center> <width> <height>
//! ```
//!
//! All four coordinates are fractions of the image size. Values outside
//! [0, 1] are kept as-is in both directions; nothing is clamped.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::data::Dimensions;
use crate::model::BoundingBox;

/// Why a single label line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelLineError {
    /// Fewer than five whitespace-separated fields
    #[error("expected 5 fields, found {found}")]
    TooFewFields {
        /// Number of fields present
        found: usize,
    },

    /// The class field is not a non-negative integer
    #[error("invalid class index '{value}'")]
    InvalidClassIndex {
        /// The offending field
        value: String,
    },

    /// A coordinate field is not a number
    #[error("invalid number '{value}'")]
    InvalidNumber {
        /// The offending field
        value: String,
    },

    /// A coordinate field is NaN or infinite
    #[error("non-finite number '{value}'")]
    NonFinite {
        /// The offending field
        value: String,
    },
}

/// One parsed YOLO detection line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLine {
    /// Class index as written. Indices above `u32::MAX` do not parse, so
    /// such lines are dropped.
    pub class_index: u32,
    /// Normalized center X
    pub x_center: f64,
    /// Normalized center Y
    pub y_center: f64,
    /// Normalized width
    pub width: f64,
    /// Normalized height
    pub height: f64,
}

fn parse_coordinate(field: &str) -> Result<f64, LabelLineError> {
    let value: f64 = field.parse().map_err(|_| LabelLineError::InvalidNumber {
        value: field.to_string(),
    })?;
    if !value.is_finite() {
        return Err(LabelLineError::NonFinite {
            value: field.to_string(),
        });
    }
    Ok(value)
}

impl FromStr for LabelLine {
    type Err = LabelLineError;

    /// Parse a line; fields past the fifth are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return Err(LabelLineError::TooFewFields { found: parts.len() });
        }

        let class_index = parts[0]
            .parse()
            .map_err(|_| LabelLineError::InvalidClassIndex {
                value: parts[0].to_string(),
            })?;

        Ok(Self {
            class_index,
            x_center: parse_coordinate(parts[1])?,
            y_center: parse_coordinate(parts[2])?,
            width: parse_coordinate(parts[3])?,
            height: parse_coordinate(parts[4])?,
        })
    }
}

impl fmt::Display for LabelLine {
    /// Six digits after the decimal point for every coordinate.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_index, self.x_center, self.y_center, self.width, self.height
        )
    }
}

impl LabelLine {
    /// Normalize a pixel-space box against usable (non-zero) image dimensions.
    pub fn from_pixel_box(bbox: &BoundingBox, class_index: u32, dims: Dimensions) -> Self {
        let dw = 1.0 / f64::from(dims.width);
        let dh = 1.0 / f64::from(dims.height);
        let (x_center, y_center) = bbox.center();
        Self {
            class_index,
            x_center: x_center * dw,
            y_center: y_center * dh,
            width: bbox.w * dw,
            height: bbox.h * dh,
        }
    }

    /// Convert back to a top-left pixel box.
    pub fn to_pixel_box(&self, dims: Dimensions) -> BoundingBox {
        let width = f64::from(dims.width);
        let height = f64::from(dims.height);
        let box_w = self.width * width;
        let box_h = self.height * height;
        BoundingBox::new(
            self.class_index,
            self.x_center * width - box_w / 2.0,
            self.y_center * height - box_h / 2.0,
            box_w,
            box_h,
        )
    }
}

/// Parse a whole label file, dropping blank and malformed lines.
///
/// Returns the surviving lines in file order and the number of lines dropped.
pub fn parse_label_text(text: &str) -> (Vec<LabelLine>, usize) {
    let mut lines = Vec::new();
    let mut dropped = 0;
    for (number, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match raw.parse::<LabelLine>() {
            Ok(line) => lines.push(line),
            Err(e) => {
                log::trace!("Dropping label line {}: {}", number + 1, e);
                dropped += 1;
            }
        }
    }
    (lines, dropped)
}
