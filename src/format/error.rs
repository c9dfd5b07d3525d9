//! Error types for archive import/export.

use thiserror::Error;
use zip::result::ZipError;

/// Terminal failures of a YOLO import or export.
///
/// Recoverable conditions (malformed label lines, unmatched labels, images
/// that cannot be probed, malformed annotation records) never surface here;
/// the converters absorb them and report counts instead.
///
/// `Io` and `Archive` are internal failures: files written before the
/// failure stay on disk, and re-running the operation is safe because every
/// write is a whole-file overwrite.
#[derive(Error, Debug)]
pub enum InterchangeError {
    /// The input bytes are not a readable ZIP container
    #[error("Invalid ZIP archive: {0}")]
    InvalidArchive(#[source] ZipError),

    /// The target job does not exist
    #[error("Job not found: {job_id}")]
    JobNotFound {
        /// The requested job id
        job_id: String,
    },

    /// A label file inside the archive is not UTF-8 text
    #[error("Label file '{entry}' is not valid UTF-8")]
    LabelEncoding {
        /// Archive entry name
        entry: String,
        /// Underlying decoding error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// I/O error while reading entries or writing storage
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive failure after the container was opened
    #[error("Archive error: {0}")]
    Archive(#[from] ZipError),
}

impl InterchangeError {
    /// Whether this is an unexpected processing failure rather than a rejected input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Archive(_) | Self::LabelEncoding { .. }
        )
    }

    pub(crate) fn job_not_found(job_id: impl Into<String>) -> Self {
        Self::JobNotFound {
            job_id: job_id.into(),
        }
    }
}
