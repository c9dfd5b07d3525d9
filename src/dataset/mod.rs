//! File-backed dataset: jobs, images, annotations and classes.
//!
//! ## Layout
//!
//! ```text
//! <data root>/
//!   classes.json                 global class registry
//!   jobs/<job id>/meta.json      {"name": ..., "created": ...}
//!   jobs/<job id>/images/<file>  raw image bytes
//!   jobs/<job id>/annotations/<file>.json
//! ```
//!
//! [`Dataset`] bundles the registries over one [`Storage`] and one
//! [`ImageProbe`], and hands out the YOLO converters built on them.

mod annotations;
mod classes;
mod jobs;
mod record;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

pub use annotations::AnnotationStore;
pub use classes::{ClassCatalog, ClassRegistry};
pub use jobs::{JobRegistry, is_valid_job_id};
pub use record::RecordError;

use crate::constants::has_image_extension;
use crate::data::{HeaderProbe, ImageProbe};
use crate::format::yolo::{YoloExporter, YoloImporter};
use crate::model::{BoundingBox, ImageRecord, JobSnapshot};
use crate::storage::{FsStorage, MemoryStorage, Storage};

/// Errors from dataset CRUD operations.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The job does not exist
    #[error("Job not found: {job_id}")]
    JobNotFound {
        /// The requested job id
        job_id: String,
    },

    /// The image name is empty, hidden, or not a plain filename
    #[error("Invalid image name: {name:?}")]
    InvalidImageName {
        /// The rejected name
        name: String,
    },

    /// Storage failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Jobs, annotations and classes over a shared storage.
#[derive(Clone)]
pub struct Dataset {
    storage: Arc<dyn Storage>,
    probe: Arc<dyn ImageProbe>,
    jobs: JobRegistry,
    annotations: AnnotationStore,
    classes: ClassRegistry,
}

impl Dataset {
    /// Create a dataset over `storage`, probing images with `probe`.
    pub fn new(storage: Arc<dyn Storage>, probe: Arc<dyn ImageProbe>) -> Self {
        let jobs = JobRegistry::new(storage.clone());
        let annotations = AnnotationStore::new(storage.clone(), jobs.clone());
        let classes = ClassRegistry::new(storage.clone());
        Self {
            storage,
            probe,
            jobs,
            annotations,
            classes,
        }
    }

    /// Open a dataset stored in a directory on disk.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsStorage::new(data_dir)), Arc::new(HeaderProbe))
    }

    /// Create an empty dataset held in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(HeaderProbe))
    }

    /// The underlying storage.
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// The image probe.
    pub fn probe(&self) -> &dyn ImageProbe {
        self.probe.as_ref()
    }

    /// The job registry.
    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    /// The annotation store.
    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// The class registry.
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// YOLO archive importer over this dataset.
    pub fn importer(&self) -> YoloImporter<'_> {
        YoloImporter::new(
            self.storage(),
            &self.jobs,
            &self.annotations,
            self.probe(),
        )
    }

    /// YOLO archive exporter over this dataset, using the global class registry.
    pub fn exporter(&self) -> YoloExporter<'_> {
        YoloExporter::new(
            self.storage(),
            &self.jobs,
            &self.annotations,
            &self.classes,
            self.probe(),
        )
    }

    fn require_job(&self, job_id: &str) -> Result<(), DatasetError> {
        if self.jobs.exists(job_id) {
            Ok(())
        } else {
            Err(DatasetError::JobNotFound {
                job_id: job_id.to_string(),
            })
        }
    }

    /// Store an uploaded image in a job and report its dimensions.
    ///
    /// Directory components of `filename` are discarded; an existing image of
    /// the same name is replaced.
    pub fn add_image(
        &self,
        job_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<ImageRecord, DatasetError> {
        self.require_job(job_id)?;
        let name = upload_name(filename).ok_or_else(|| DatasetError::InvalidImageName {
            name: filename.to_string(),
        })?;

        let images_dir = self.jobs.paths(job_id).images_dir;
        self.storage.create_dir_all(&images_dir)?;
        self.storage.write(&images_dir.join(name), data)?;

        let dims = self.probe.dimensions_or_unknown(data, name);
        log::info!(
            "Added image '{}' to job '{}' ({}x{})",
            name,
            job_id,
            dims.width,
            dims.height
        );
        Ok(ImageRecord {
            name: name.to_string(),
            width: dims.width,
            height: dims.height,
            boxes: Vec::new(),
        })
    }

    /// Classes plus every image of a job with its dimensions and boxes, sorted by name.
    pub fn job_snapshot(&self, job_id: &str) -> Result<JobSnapshot, DatasetError> {
        self.require_job(job_id)?;
        let classes = self.classes.load();
        let images_dir = self.jobs.paths(job_id).images_dir;

        let entries = match self.storage.list(&images_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        for entry in entries {
            if entry.is_dir || !has_image_extension(&entry.name) {
                continue;
            }
            let dims = match self.storage.read(&images_dir.join(&entry.name)) {
                Ok(data) => self.probe.dimensions_or_unknown(&data, &entry.name),
                Err(e) => {
                    log::warn!("Could not read image '{}': {}", entry.name, e);
                    crate::data::Dimensions::UNKNOWN
                }
            };
            let boxes = self.annotations.load(job_id, &entry.name);
            images.push(ImageRecord {
                name: entry.name,
                width: dims.width,
                height: dims.height,
                boxes,
            });
        }
        images.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(JobSnapshot { classes, images })
    }

    /// Replace the boxes of one image.
    pub fn save_annotation(
        &self,
        job_id: &str,
        image_name: &str,
        boxes: &[BoundingBox],
    ) -> Result<(), DatasetError> {
        if !is_valid_job_id(job_id) {
            return Err(DatasetError::JobNotFound {
                job_id: job_id.to_string(),
            });
        }
        if image_name.is_empty() || image_name.contains(['/', '\\']) {
            return Err(DatasetError::InvalidImageName {
                name: image_name.to_string(),
            });
        }
        self.annotations.save(job_id, image_name, boxes)?;
        Ok(())
    }
}

/// Plain filename under which an upload is stored, or `None` if unusable.
fn upload_name(filename: &str) -> Option<&str> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    (!name.is_empty() && !name.starts_with('.')).then_some(name)
}
