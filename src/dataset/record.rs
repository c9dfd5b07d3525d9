//! JSON records kept in storage.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::Storage;

/// Why a stored JSON record could not be read.
///
/// Callers decide per call site whether a variant is fatal; the stores in
/// this module absorb all three into a default value.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// No record exists at the path
    #[error("Record not found: {path:?}")]
    Missing {
        /// Path of the missing record
        path: PathBuf,
    },

    /// The record exists but is not valid JSON of the expected shape
    #[error("Malformed record {path:?}: {source}")]
    Malformed {
        /// Path of the malformed record
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be read
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        /// Path of the unreadable record
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Read and parse a JSON record.
pub(crate) fn read_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    path: &Path,
) -> Result<T, RecordError> {
    let bytes = storage.read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            RecordError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            RecordError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|source| RecordError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as indented JSON and replace the record at `path`.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    path: &Path,
    value: &T,
) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    storage.write(path, &json)
}
