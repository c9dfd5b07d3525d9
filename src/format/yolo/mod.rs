//! YOLO detection format in ZIP archives.
//!
//! Label files hold one box per line:
//!
//! ```text
//! <class_index> <x_center> <y_center> <width> <height>
//! ```
//!
//! with coordinates normalized to the image size. Boxes are stored in pixel
//! space, so both directions need the image dimensions; images whose
//! dimensions cannot be probed never get labels in either direction.

mod archive;
mod export;
mod import;
mod label;
mod summary;

#[cfg(test)]
mod tests;

pub use archive::{EntryKind, ExtractedImages, classify_entry, entry_file_name};
pub use export::YoloExporter;
pub use import::YoloImporter;
pub use label::{LabelLine, LabelLineError, parse_label_text};
pub use summary::{ExportSummary, ExportWarning, ExportedArchive, ImportSummary};
