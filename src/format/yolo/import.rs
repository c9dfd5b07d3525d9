//! YOLO archive import.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use super::archive::{EntryKind, ExtractedImages, classify_entry};
use super::label::parse_label_text;
use super::summary::ImportSummary;
use crate::data::ImageProbe;
use crate::dataset::{AnnotationStore, JobRegistry};
use crate::format::InterchangeError;
use crate::model::{BoundingBox, JobPaths};
use crate::storage::Storage;

type Archive<'b> = ZipArchive<Cursor<&'b [u8]>>;

/// Preallocation for an entry. The size an entry declares is untrusted, so
/// the hint never exceeds the size of the whole archive.
fn capacity_hint(declared: u64, input_len: usize) -> usize {
    usize::try_from(declared).map_or(input_len, |size| size.min(input_len))
}

/// Imports a ZIP of images and YOLO label files into an existing job.
///
/// The import runs in two passes over the archive:
///
/// 1. Every image entry is written into the job's image directory under its
///    base filename (later entries with the same filename overwrite earlier
///    ones) and probed for its dimensions.
/// 2. Every label entry is paired with the first extracted image sharing its
///    stem, denormalized against that image's dimensions, and saved as the
///    image's annotation.
///
/// The import is not transactional: on a terminal error, images and
/// annotations already written stay in place.
pub struct YoloImporter<'a> {
    storage: &'a dyn Storage,
    jobs: &'a JobRegistry,
    annotations: &'a AnnotationStore,
    probe: &'a dyn ImageProbe,
}

impl<'a> YoloImporter<'a> {
    /// Create an importer over the given components.
    pub fn new(
        storage: &'a dyn Storage,
        jobs: &'a JobRegistry,
        annotations: &'a AnnotationStore,
        probe: &'a dyn ImageProbe,
    ) -> Self {
        Self {
            storage,
            jobs,
            annotations,
            probe,
        }
    }

    /// Import `archive` into `job_id`.
    pub fn import(&self, archive: &[u8], job_id: &str) -> Result<ImportSummary, InterchangeError> {
        log::info!(
            "Importing YOLO archive ({} bytes) into job '{}'",
            archive.len(),
            job_id
        );

        let input_len = archive.len();
        let mut archive =
            ZipArchive::new(Cursor::new(archive)).map_err(InterchangeError::InvalidArchive)?;

        if !self.jobs.exists(job_id) {
            return Err(InterchangeError::job_not_found(job_id));
        }

        let paths = self.jobs.paths(job_id);
        self.storage.create_dir_all(&paths.images_dir)?;
        self.storage.create_dir_all(&paths.annotations_dir)?;

        let mut summary = ImportSummary::default();
        let images = self.extract_images(&mut archive, input_len, &paths, &mut summary)?;
        self.apply_labels(&mut archive, input_len, job_id, &images, &mut summary)?;

        log::info!(
            "Imported {} images into job '{}': {} annotated with {} boxes, {} label files skipped",
            summary.imported,
            job_id,
            summary.annotated,
            summary.boxes,
            summary.skipped
        );
        Ok(summary)
    }

    /// Pass 1: write every image entry and record its dimensions.
    fn extract_images(
        &self,
        archive: &mut Archive<'_>,
        input_len: usize,
        paths: &JobPaths,
        summary: &mut ImportSummary,
    ) -> Result<ExtractedImages, InterchangeError> {
        let mut images = ExtractedImages::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            let file_name = match classify_entry(&name, entry.is_dir()) {
                EntryKind::Image { file_name } => file_name,
                _ => continue,
            };

            let mut data = Vec::with_capacity(capacity_hint(entry.size(), input_len));
            entry.read_to_end(&mut data)?;
            self.storage.write(&paths.images_dir.join(file_name), &data)?;

            let dims = self.probe.dimensions_or_unknown(&data, file_name);
            log::debug!(
                "Extracted image '{}' as '{}' ({}x{})",
                name,
                file_name,
                dims.width,
                dims.height
            );

            images.insert(file_name, dims);
            summary.imported += 1;
        }

        Ok(images)
    }

    /// Pass 2: pair label entries with extracted images and save their boxes.
    fn apply_labels(
        &self,
        archive: &mut Archive<'_>,
        input_len: usize,
        job_id: &str,
        images: &ExtractedImages,
        summary: &mut ImportSummary,
    ) -> Result<(), InterchangeError> {
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            let stem = match classify_entry(&name, entry.is_dir()) {
                EntryKind::Label { stem, .. } => stem,
                _ => continue,
            };

            let Some((image_name, dims)) = images.find_by_stem(stem) else {
                log::debug!("Skipping label '{}': no image named '{}.*'", name, stem);
                summary.skipped += 1;
                continue;
            };

            if !dims.is_usable() {
                log::debug!(
                    "Skipping label '{}': image '{}' has unknown dimensions",
                    name,
                    image_name
                );
                summary.skipped += 1;
                continue;
            }

            let mut raw = Vec::with_capacity(capacity_hint(entry.size(), input_len));
            entry.read_to_end(&mut raw)?;
            let text = String::from_utf8(raw).map_err(|source| InterchangeError::LabelEncoding {
                entry: name.clone(),
                source,
            })?;

            let (lines, dropped) = parse_label_text(&text);
            if dropped > 0 {
                log::debug!("Dropped {} malformed lines from '{}'", dropped, name);
            }

            let boxes: Vec<BoundingBox> = lines.iter().map(|line| line.to_pixel_box(dims)).collect();
            if boxes.is_empty() {
                log::debug!("Label '{}' has no usable lines, nothing saved", name);
                continue;
            }

            self.annotations.save(job_id, image_name, &boxes)?;
            summary.annotated += 1;
            summary.boxes += boxes.len();
        }

        Ok(())
    }
}
