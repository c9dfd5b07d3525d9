//! Per-image box lists stored as JSON.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use super::jobs::JobRegistry;
use super::record::{RecordError, read_json, write_json};
use crate::constants::ANNOTATION_EXTENSION;
use crate::model::BoundingBox;
use crate::storage::Storage;

/// Store of annotations keyed by (job id, image filename).
///
/// Each annotation is a JSON array of boxes at
/// `jobs/<job>/annotations/<image>.json`. Saving replaces the whole file.
#[derive(Clone)]
pub struct AnnotationStore {
    storage: Arc<dyn Storage>,
    jobs: JobRegistry,
}

impl AnnotationStore {
    /// Create a store over `storage`, resolving job directories through `jobs`.
    pub fn new(storage: Arc<dyn Storage>, jobs: JobRegistry) -> Self {
        Self { storage, jobs }
    }

    fn record_path(&self, job_id: &str, image_name: &str) -> PathBuf {
        self.jobs
            .paths(job_id)
            .annotations_dir
            .join(format!("{}.{}", image_name, ANNOTATION_EXTENSION))
    }

    /// Load the boxes of an image, reporting why nothing could be loaded.
    pub fn try_load(
        &self,
        job_id: &str,
        image_name: &str,
    ) -> Result<Vec<BoundingBox>, RecordError> {
        read_json(self.storage.as_ref(), &self.record_path(job_id, image_name))
    }

    /// Load the boxes of an image.
    ///
    /// A missing, unreadable or malformed record yields an empty list.
    pub fn load(&self, job_id: &str, image_name: &str) -> Vec<BoundingBox> {
        match self.try_load(job_id, image_name) {
            Ok(boxes) => boxes,
            Err(RecordError::Missing { .. }) => Vec::new(),
            Err(e) => {
                log::warn!(
                    "Treating annotation of '{}' in job '{}' as empty: {}",
                    image_name,
                    job_id,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replace the boxes of an image, creating the annotation directory if needed.
    pub fn save(&self, job_id: &str, image_name: &str, boxes: &[BoundingBox]) -> io::Result<()> {
        self.storage
            .create_dir_all(&self.jobs.paths(job_id).annotations_dir)?;
        write_json(
            self.storage.as_ref(),
            &self.record_path(job_id, image_name),
            boxes,
        )?;
        log::debug!(
            "Saved {} boxes for '{}' in job '{}'",
            boxes.len(),
            image_name,
            job_id
        );
        Ok(())
    }
}
