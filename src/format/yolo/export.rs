//! YOLO archive export.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::label::LabelLine;
use super::summary::{ExportSummary, ExportWarning, ExportedArchive};
use crate::constants::{
    EXPORT_IMAGES_FOLDER, EXPORT_LABELS_FOLDER, LABEL_EXTENSION, YOLO_CLASSES_FILE, file_stem,
    has_image_extension,
};
use crate::data::ImageProbe;
use crate::dataset::{AnnotationStore, ClassCatalog, JobRegistry, RecordError};
use crate::format::InterchangeError;
use crate::model::BoundingBox;
use crate::storage::Storage;

type Writer = ZipWriter<Cursor<Vec<u8>>>;

/// Exports one job, or every job, as a YOLO ZIP archive.
///
/// Archive layout:
///
/// ```text
/// classes.txt            class names in registry order
/// images/<file>          original image bytes
/// labels/<stem>.txt      only for images with boxes and known dimensions
/// ```
///
/// Export is best-effort per image: an image that cannot be read is left
/// out, and a malformed annotation record behaves as if absent. Both are
/// reported in [`ExportSummary::warnings`]. Failures writing the archive
/// itself are terminal.
pub struct YoloExporter<'a> {
    storage: &'a dyn Storage,
    jobs: &'a JobRegistry,
    annotations: &'a AnnotationStore,
    classes: &'a dyn ClassCatalog,
    probe: &'a dyn ImageProbe,
}

/// Archive under construction and the entry names already in it.
struct ArchiveState {
    zip: Writer,
    written: HashSet<String>,
}

impl ArchiveState {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            written: HashSet::new(),
        }
    }

    fn add(&mut self, name: String, data: &[u8]) -> Result<(), InterchangeError> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(name.as_str(), options)?;
        self.zip.write_all(data)?;
        self.written.insert(name);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.written.contains(name)
    }
}

impl<'a> YoloExporter<'a> {
    /// Create an exporter over the given components.
    pub fn new(
        storage: &'a dyn Storage,
        jobs: &'a JobRegistry,
        annotations: &'a AnnotationStore,
        classes: &'a dyn ClassCatalog,
        probe: &'a dyn ImageProbe,
    ) -> Self {
        Self {
            storage,
            jobs,
            annotations,
            classes,
            probe,
        }
    }

    /// Build the archive for `job_filter`, or for every job when `None`.
    ///
    /// A filter naming a job that does not exist yields an archive holding
    /// only `classes.txt`.
    pub fn export(&self, job_filter: Option<&str>) -> Result<ExportedArchive, InterchangeError> {
        let class_names = self.classes.class_names();

        let mut archive = ArchiveState::new();
        archive.add(
            YOLO_CLASSES_FILE.to_string(),
            class_names.join("\n").as_bytes(),
        )?;

        let mut summary = ExportSummary::default();
        for job_id in self.target_jobs(job_filter)? {
            self.export_job(&mut archive, &job_id, class_names.len(), &mut summary)?;
            summary.jobs += 1;
        }

        let bytes = archive.zip.finish()?.into_inner();
        log::info!(
            "Exported {} jobs: {} images, {} label files, {} boxes ({} warnings, {} bytes)",
            summary.jobs,
            summary.images,
            summary.labels,
            summary.boxes,
            summary.warnings.len(),
            bytes.len()
        );
        Ok(ExportedArchive { bytes, summary })
    }

    fn target_jobs(&self, job_filter: Option<&str>) -> Result<Vec<String>, InterchangeError> {
        match job_filter {
            Some(job_id) if self.jobs.exists(job_id) => Ok(vec![job_id.to_string()]),
            Some(job_id) => {
                log::info!("Job '{}' not found, exporting classes only", job_id);
                Ok(Vec::new())
            }
            None => Ok(self.jobs.ids()?),
        }
    }

    fn export_job(
        &self,
        archive: &mut ArchiveState,
        job_id: &str,
        class_count: usize,
        summary: &mut ExportSummary,
    ) -> Result<(), InterchangeError> {
        let images_dir = self.jobs.paths(job_id).images_dir;
        if !self.storage.is_dir(&images_dir) {
            log::debug!("Job '{}' has no image directory", job_id);
            return Ok(());
        }

        for entry in self.storage.list(&images_dir)? {
            if entry.is_dir || !has_image_extension(&entry.name) {
                continue;
            }
            self.export_image(archive, job_id, &images_dir, &entry.name, class_count, summary)?;
        }
        Ok(())
    }

    fn export_image(
        &self,
        archive: &mut ArchiveState,
        job_id: &str,
        images_dir: &Path,
        file_name: &str,
        class_count: usize,
        summary: &mut ExportSummary,
    ) -> Result<(), InterchangeError> {
        let mut warn = |message: String| {
            log::warn!("Export of '{}' in job '{}': {}", file_name, job_id, message);
            summary.warnings.push(ExportWarning {
                job_id: job_id.to_string(),
                image: file_name.to_string(),
                message,
            });
        };

        let image_entry = format!("{}/{}", EXPORT_IMAGES_FOLDER, file_name);
        if archive.contains(&image_entry) {
            warn(format!("'{}' already exported from another job", image_entry));
            return Ok(());
        }

        let data = match self.storage.read(&images_dir.join(file_name)) {
            Ok(data) => data,
            Err(e) => {
                warn(format!("image unreadable: {}", e));
                return Ok(());
            }
        };

        let boxes = match self.annotations.try_load(job_id, file_name) {
            Ok(boxes) => boxes,
            Err(RecordError::Missing { .. }) => Vec::new(),
            Err(e) => {
                warn(format!("annotation ignored: {}", e));
                Vec::new()
            }
        };

        let label = if boxes.is_empty() {
            None
        } else {
            let label_entry = format!(
                "{}/{}.{}",
                EXPORT_LABELS_FOLDER,
                file_stem(file_name),
                LABEL_EXTENSION
            );
            if archive.contains(&label_entry) {
                warn(format!("'{}' already exported for another image", label_entry));
                None
            } else {
                self.label_text(&data, file_name, &boxes, class_count)
                    .map(|(text, count)| (label_entry, text, count))
            }
        };

        archive.add(image_entry, &data)?;
        summary.images += 1;

        if let Some((label_entry, text, count)) = label {
            archive.add(label_entry, text.as_bytes())?;
            summary.labels += 1;
            summary.boxes += count;
        }
        Ok(())
    }

    /// Label file content for an image, or `None` when its dimensions are unknown.
    fn label_text(
        &self,
        image: &[u8],
        file_name: &str,
        boxes: &[BoundingBox],
        class_count: usize,
    ) -> Option<(String, usize)> {
        let dims = self.probe.dimensions_or_unknown(image, file_name);
        if !dims.is_usable() {
            log::debug!("No label for '{}': dimensions unknown", file_name);
            return None;
        }

        let lines: Vec<String> = boxes
            .iter()
            .map(|bbox| {
                let class_index = if bbox.class_index as usize >= class_count {
                    log::debug!(
                        "Class index {} out of range in '{}', using 0",
                        bbox.class_index,
                        file_name
                    );
                    0
                } else {
                    bbox.class_index
                };
                LabelLine::from_pixel_box(bbox, class_index, dims).to_string()
            })
            .collect();
        Some((lines.join("\n"), lines.len()))
    }
}
