//! Global constants for the YOLAT data layout and interchange formats

/// Image file extensions accepted by import, export and snapshots (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Directory under the data root holding one subdirectory per job
pub const JOBS_DIR: &str = "jobs";

/// Per-job image directory name
pub const IMAGES_DIR: &str = "images";

/// Per-job annotation directory name
pub const ANNOTATIONS_DIR: &str = "annotations";

/// Per-job metadata file name
pub const JOB_META_FILE: &str = "meta.json";

/// Global class registry file name, stored at the data root
pub const CLASSES_FILE: &str = "classes.json";

/// Class list file inside YOLO archives
pub const YOLO_CLASSES_FILE: &str = "classes.txt";

/// Archive folder for exported images
pub const EXPORT_IMAGES_FOLDER: &str = "images";

/// Archive folder for exported label files
pub const EXPORT_LABELS_FOLDER: &str = "labels";

/// Extension of YOLO label files
pub const LABEL_EXTENSION: &str = "txt";

/// Extension appended to an image filename to form its annotation record name
pub const ANNOTATION_EXTENSION: &str = "json";

/// Prefix of generated job identifiers
pub const JOB_ID_PREFIX: &str = "job_";

/// Display name used by callers that create a job without one
pub const DEFAULT_JOB_NAME: &str = "New Job";

/// Name of the class used when no class registry exists
pub const DEFAULT_CLASS_NAME: &str = "object";

/// Display color of the default class
pub const DEFAULT_CLASS_COLOR: &str = "#00ff00";

/// Check whether a filename has one of the supported image extensions (case-insensitive).
pub fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Base name of a file without its final extension (`"a.b.txt"` -> `"a.b"`).
pub fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(base, _)| base).unwrap_or(name)
}
