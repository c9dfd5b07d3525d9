//! Annotation interchange formats.
//!
//! Only the YOLO detection format is supported: one `<stem>.txt` label file
//! per image with normalized center coordinates, plus a `classes.txt`, all
//! packed in a ZIP archive.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use yolat::Dataset;
//!
//! let dataset = Dataset::open("data");
//! let summary = dataset.importer().import(&zip_bytes, "job_1700000000")?;
//! let archive = dataset.exporter().export(Some("job_1700000000"))?;
//! std::fs::write("yolo_dataset.zip", archive.bytes)?;
//! ```

mod error;
pub mod yolo;

pub use error::InterchangeError;
