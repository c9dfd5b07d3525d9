//! Scenario tests for YOLO archive import and export.
//!
//! Archives are assembled in memory and images are real PNGs encoded on the
//! fly, so dimension probing runs the same code as in production.

mod export_tests;

use std::io::{Cursor, Read, Write};
use std::time::{Duration, UNIX_EPOCH};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::Dataset;

/// Encode a black PNG of the given size.
fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::GrayImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Build a ZIP archive; names ending in `/` become directory entries.
fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, SimpleFileOptions::default())
                .unwrap();
        } else {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

/// Read every entry of an archive, in archive order.
fn entries_of(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

/// Text of one entry, if present.
fn entry_text(bytes: &[u8], name: &str) -> Option<String> {
    entries_of(bytes)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, data)| String::from_utf8(data).unwrap())
}

/// Names of all entries, in archive order.
fn entry_names(bytes: &[u8]) -> Vec<String> {
    entries_of(bytes).into_iter().map(|(n, _)| n).collect()
}

/// In-memory dataset with one empty job created at `secs` past the epoch.
fn dataset_with_job(secs: u64) -> (Dataset, String) {
    let dataset = Dataset::in_memory();
    let job = create_job(&dataset, "fixture", secs);
    (dataset, job)
}

fn create_job(dataset: &Dataset, name: &str, secs: u64) -> String {
    dataset
        .jobs()
        .create_at(name, UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap()
}
