//! Job and image records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, ClassDef};

/// Metadata persisted as `meta.json` in each job directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMeta {
    /// Display name
    pub name: String,
    /// Creation time in fractional seconds since the Unix epoch
    #[serde(default)]
    pub created: f64,
}

/// One row of the job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    /// Job identifier (directory name)
    pub id: String,
    /// Display name; falls back to the id when metadata is missing or unreadable
    pub name: String,
    /// Number of non-hidden entries in the image directory
    pub image_count: usize,
}

/// Storage locations of a job, relative to the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    /// The job directory itself
    pub job_dir: PathBuf,
    /// Directory holding the raw image files
    pub images_dir: PathBuf,
    /// Directory holding one `<image>.json` per annotated image
    pub annotations_dir: PathBuf,
}

/// An image of a job with its probed dimensions and stored boxes.
///
/// `width == 0 || height == 0` means the dimensions are unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Filename, unique within the job
    pub name: String,
    /// Width in pixels (0 when unknown)
    pub width: u32,
    /// Height in pixels (0 when unknown)
    pub height: u32,
    /// Stored boxes, in saved order
    pub boxes: Vec<BoundingBox>,
}

/// Everything a client needs to start annotating a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Global class registry at read time
    pub classes: Vec<ClassDef>,
    /// Images sorted by name
    pub images: Vec<ImageRecord>,
}
