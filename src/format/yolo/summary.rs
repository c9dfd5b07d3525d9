//! Results of import and export operations.

use serde::Serialize;

/// Counts produced by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Image entries extracted (entries sharing a filename count once each)
    pub imported: usize,
    /// Label files with no matching image, or whose image has unknown dimensions
    pub skipped: usize,
    /// Annotation records written (one per paired, non-empty label file)
    pub annotated: usize,
    /// Boxes written across all annotation records
    pub boxes: usize,
}

/// Something an export left out, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportWarning {
    /// Job the item belongs to
    pub job_id: String,
    /// Image filename
    pub image: String,
    /// Human-readable reason
    pub message: String,
}

/// Counts produced by an export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Jobs included
    pub jobs: usize,
    /// Images written under `images/`
    pub images: usize,
    /// Label files written under `labels/`
    pub labels: usize,
    /// Label lines written
    pub boxes: usize,
    /// Items skipped on the best-effort path
    pub warnings: Vec<ExportWarning>,
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    /// ZIP archive bytes
    pub bytes: Vec<u8>,
    /// What went into the archive
    pub summary: ExportSummary,
}
