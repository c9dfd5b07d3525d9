//! ZIP entry classification for YOLO archives.
//!
//! Directory structure inside an archive is ignored: every entry is known
//! by its base filename only.

use std::collections::HashMap;

use crate::constants::{LABEL_EXTENSION, YOLO_CLASSES_FILE, file_stem, has_image_extension};
use crate::data::Dimensions;

/// What an archive entry contributes to an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind<'a> {
    /// An image, stored under its base filename
    Image {
        /// Base filename
        file_name: &'a str,
    },
    /// A label file, paired with the image sharing its stem
    Label {
        /// Base filename
        file_name: &'a str,
        /// Base filename without extension
        stem: &'a str,
    },
    /// `classes.txt` in any folder and any letter case
    ClassList,
    /// Directories, hidden files and unrelated files
    Ignored,
}

/// Final path component of an archive entry name.
pub fn entry_file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Classify an archive entry by its name.
pub fn classify_entry(name: &str, is_dir: bool) -> EntryKind<'_> {
    let file_name = entry_file_name(name);
    if is_dir || name.ends_with('/') || file_name.is_empty() || file_name.starts_with('.') {
        return EntryKind::Ignored;
    }

    if has_image_extension(file_name) {
        return EntryKind::Image { file_name };
    }

    let is_label = file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(LABEL_EXTENSION));
    if !is_label {
        return EntryKind::Ignored;
    }
    if file_name.eq_ignore_ascii_case(YOLO_CLASSES_FILE) {
        return EntryKind::ClassList;
    }

    EntryKind::Label {
        file_name,
        stem: file_stem(file_name),
    }
}

/// Images extracted by an import, in first-seen order.
///
/// Re-extracting a filename replaces its dimensions but keeps its original
/// position, so label pairing always prefers the earliest-seen filename
/// among those sharing a stem.
#[derive(Debug, Default)]
pub struct ExtractedImages {
    order: Vec<String>,
    dimensions: HashMap<String, Dimensions>,
}

impl ExtractedImages {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an extracted image. Last write wins for the dimensions.
    pub fn insert(&mut self, file_name: &str, dims: Dimensions) {
        if self.dimensions.insert(file_name.to_string(), dims).is_none() {
            self.order.push(file_name.to_string());
        }
    }

    /// First image (in first-seen order) whose stem equals `stem`.
    pub fn find_by_stem(&self, stem: &str) -> Option<(&str, Dimensions)> {
        self.order
            .iter()
            .find(|name| file_stem(name) == stem)
            .and_then(|name| {
                self.dimensions
                    .get(name)
                    .map(|dims| (name.as_str(), *dims))
            })
    }
}
