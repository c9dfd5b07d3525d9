//! Tests for YOLO archive export.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use super::{create_job, dataset_with_job, entry_names, entry_text, entries_of, png};
use crate::Dataset;
use crate::data::HeaderProbe;
use crate::format::yolo::YoloExporter;
use crate::model::{BoundingBox, ClassDef};
use crate::storage::{MemoryStorage, Storage, StorageEntry};

/// Memory storage where one file name cannot be read.
struct UnreadableFile {
    inner: MemoryStorage,
    name: &'static str,
}

impl Storage for UnreadableFile {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }

    fn list(&self, path: &Path) -> io::Result<Vec<StorageEntry>> {
        self.inner.list(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if path.file_name().is_some_and(|n| n == self.name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        self.inner.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.inner.write(path, data)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
}

fn classes(names: &[&str]) -> Vec<ClassDef> {
    names.iter().map(|n| ClassDef::new(*n, "#ffffff")).collect()
}

#[test]
fn test_export_normalizes_boxes() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "a.png", &png(1000, 500)).unwrap();
    dataset
        .save_annotation(&job, "a.png", &[BoundingBox::new(0, 100.0, 100.0, 200.0, 100.0)])
        .unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(
        entry_text(&archive.bytes, "labels/a.txt").unwrap(),
        "0 0.200000 0.300000 0.200000 0.200000"
    );
    assert_eq!(archive.summary.images, 1);
    assert_eq!(archive.summary.labels, 1);
    assert_eq!(archive.summary.boxes, 1);
    assert!(archive.summary.warnings.is_empty());
}

#[test]
fn test_archive_layout_and_image_bytes() {
    let (dataset, job) = dataset_with_job(100);
    let image = png(64, 32);
    dataset.add_image(&job, "cat.photo.png", &image).unwrap();
    dataset.add_image(&job, "plain.png", &png(8, 8)).unwrap();
    dataset
        .save_annotation(
            &job,
            "cat.photo.png",
            &[
                BoundingBox::new(0, 0.0, 0.0, 32.0, 16.0),
                BoundingBox::new(0, 32.0, 16.0, 32.0, 16.0),
            ],
        )
        .unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(
        entry_names(&archive.bytes),
        vec![
            "classes.txt",
            "images/cat.photo.png",
            "labels/cat.photo.txt",
            "images/plain.png",
        ]
    );
    let entries = entries_of(&archive.bytes);
    assert_eq!(entries[1].1, image);
    assert_eq!(
        entry_text(&archive.bytes, "labels/cat.photo.txt").unwrap(),
        "0 0.250000 0.250000 0.500000 0.500000\n0 0.750000 0.750000 0.500000 0.500000"
    );
}

#[test]
fn test_classes_txt_follows_registry_order() {
    let (dataset, job) = dataset_with_job(100);
    dataset.classes().save(&classes(&["car", "person", "dog"])).unwrap();
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();
    dataset
        .save_annotation(
            &job,
            "a.png",
            &[
                BoundingBox::new(2, 0.0, 0.0, 1.0, 1.0),
                BoundingBox::new(0, 0.0, 0.0, 1.0, 1.0),
            ],
        )
        .unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(
        entry_text(&archive.bytes, "classes.txt").unwrap(),
        "car\nperson\ndog"
    );
    let label = entry_text(&archive.bytes, "labels/a.txt").unwrap();
    let indices: Vec<_> = label.lines().map(|l| &l[..1]).collect();
    assert_eq!(indices, vec!["2", "0"]);
}

#[test]
fn test_out_of_range_class_index_maps_to_zero() {
    let (dataset, job) = dataset_with_job(100);
    dataset.classes().save(&classes(&["a", "b"])).unwrap();
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();
    dataset
        .save_annotation(
            &job,
            "a.png",
            &[
                BoundingBox::new(1, 0.0, 0.0, 5.0, 5.0),
                BoundingBox::new(2, 0.0, 0.0, 5.0, 5.0),
                BoundingBox::new(99, 0.0, 0.0, 5.0, 5.0),
            ],
        )
        .unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(
        entry_text(&archive.bytes, "labels/a.txt").unwrap(),
        "1 0.250000 0.250000 0.500000 0.500000\n\
         0 0.250000 0.250000 0.500000 0.500000\n\
         0 0.250000 0.250000 0.500000 0.500000"
    );
}

#[test]
fn test_unknown_dimensions_omit_label() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "broken.png", b"\x89PNG truncated").unwrap();
    dataset
        .save_annotation(&job, "broken.png", &[BoundingBox::new(0, 1.0, 1.0, 1.0, 1.0)])
        .unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(
        entry_names(&archive.bytes),
        vec!["classes.txt", "images/broken.png"]
    );
    assert_eq!(archive.summary.labels, 0);
}

#[test]
fn test_empty_annotation_omits_label() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();
    dataset.save_annotation(&job, "a.png", &[]).unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(entry_names(&archive.bytes), vec!["classes.txt", "images/a.png"]);
}

#[test]
fn test_malformed_annotation_is_reported_not_fatal() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();
    let annotations_dir = Path::new("jobs").join(&job).join("annotations");
    dataset.storage().create_dir_all(&annotations_dir).unwrap();
    dataset
        .storage()
        .write(&annotations_dir.join("a.png.json"), b"{\"oops\": true}")
        .unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(entry_names(&archive.bytes), vec!["classes.txt", "images/a.png"]);
    assert_eq!(archive.summary.warnings.len(), 1);
    assert_eq!(archive.summary.warnings[0].image, "a.png");
}

#[test]
fn test_non_image_files_are_not_exported() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();
    dataset.add_image(&job, "readme.md", b"# notes").unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(entry_names(&archive.bytes), vec!["classes.txt", "images/a.png"]);
}

#[test]
fn test_missing_job_filter_gives_classes_only() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();

    let archive = dataset.exporter().export(Some("job_404")).unwrap();

    assert_eq!(entry_names(&archive.bytes), vec!["classes.txt"]);
    assert_eq!(
        entry_text(&archive.bytes, "classes.txt").unwrap(),
        "object"
    );
    assert_eq!(archive.summary.jobs, 0);
}

#[test]
fn test_export_all_jobs_skips_duplicate_filenames() {
    let (dataset, first) = dataset_with_job(100);
    let second = create_job(&dataset, "second", 200);
    dataset.add_image(&first, "shared.png", &png(10, 10)).unwrap();
    dataset.add_image(&first, "one.png", &png(10, 10)).unwrap();
    dataset.add_image(&second, "shared.png", &png(20, 20)).unwrap();
    dataset.add_image(&second, "two.png", &png(10, 10)).unwrap();

    let archive = dataset.exporter().export(None).unwrap();

    assert_eq!(
        entry_names(&archive.bytes),
        vec![
            "classes.txt",
            "images/one.png",
            "images/shared.png",
            "images/two.png",
        ]
    );
    assert_eq!(archive.summary.jobs, 2);
    assert_eq!(archive.summary.images, 3);
    assert_eq!(archive.summary.warnings.len(), 1);
    assert_eq!(archive.summary.warnings[0].job_id, second);
}

#[test]
fn test_export_with_explicit_class_catalog() {
    let (dataset, job) = dataset_with_job(100);
    dataset.add_image(&job, "a.png", &png(10, 10)).unwrap();
    dataset
        .save_annotation(&job, "a.png", &[BoundingBox::new(1, 0.0, 0.0, 10.0, 10.0)])
        .unwrap();

    let catalog = classes(&["first", "second"]);
    let exporter = YoloExporter::new(
        dataset.storage(),
        dataset.jobs(),
        dataset.annotations(),
        &catalog,
        dataset.probe(),
    );
    let archive = exporter.export(Some(&job)).unwrap();

    assert_eq!(
        entry_text(&archive.bytes, "classes.txt").unwrap(),
        "first\nsecond"
    );
    assert_eq!(
        entry_text(&archive.bytes, "labels/a.txt").unwrap(),
        "1 0.500000 0.500000 1.000000 1.000000"
    );
}

#[test]
fn test_unreadable_image_is_skipped_with_warning() {
    let storage = UnreadableFile {
        inner: MemoryStorage::new(),
        name: "bad.png",
    };
    let dataset = Dataset::new(Arc::new(storage), Arc::new(HeaderProbe));
    let job = dataset
        .jobs()
        .create_at("fixture", UNIX_EPOCH + Duration::from_secs(100))
        .unwrap();
    dataset.add_image(&job, "bad.png", &png(10, 10)).unwrap();
    dataset.add_image(&job, "good.png", &png(10, 10)).unwrap();
    let boxes = [BoundingBox::new(0, 0.0, 0.0, 5.0, 5.0)];
    dataset.save_annotation(&job, "bad.png", &boxes).unwrap();
    dataset.save_annotation(&job, "good.png", &boxes).unwrap();

    let archive = dataset.exporter().export(Some(&job)).unwrap();

    assert_eq!(
        entry_names(&archive.bytes),
        vec!["classes.txt", "images/good.png", "labels/good.txt"]
    );
    assert_eq!(archive.summary.images, 1);
    assert_eq!(archive.summary.labels, 1);
    assert_eq!(archive.summary.warnings.len(), 1);
    assert_eq!(archive.summary.warnings[0].image, "bad.png");
    assert_eq!(archive.summary.warnings[0].job_id, job);
}
